//! WordPress release metadata.
//!
//! Branches come from the core version-check API; packages are scraped from
//! the public release archive page.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::http::fetch_text;
use super::{ReleaseBranch, ReleaseMetadataProvider, ReleasePackage, ReleasePackages};
use crate::error_handling::ReleaseError;

const API_URL: &str = "https://api.wordpress.org/core/version-check/1.7/";
const RELEASES_URL: &str = "https://wordpress.org/download/releases/";

/// Releases never published as a usable archive.
const IGNORED_VERSIONS: &[&str] = &["1.0.2"];

#[derive(Debug, Deserialize)]
struct VersionCheck {
    offers: Vec<Offer>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    version: String,
}

/// WordPress release provider.
pub struct WordpressReleases {
    client: reqwest::Client,
    api_url: String,
    releases_url: String,
}

impl WordpressReleases {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_urls(client, API_URL, RELEASES_URL)
    }

    /// Creates a provider reading from custom endpoints.
    pub fn with_urls(
        client: reqwest::Client,
        api_url: impl Into<String>,
        releases_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            releases_url: releases_url.into(),
        }
    }
}

/// Compiles a constant pattern; a failure is a programming error.
fn compile_static(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}",
            pattern, context, e
        )
    })
}

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static(r"(\d{1,2})\.(\d{1,2})\.?(\d{1,2})?", "VERSION_RE"));
static ARCHIVE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static(
        r#"<a href="(https://wordpress\.org/wordpress-(\d{1,2}\.\d{1,2}(?:\.\d{1,2})?)\.zip)""#,
        "ARCHIVE_LINK_RE",
    )
});

/// Parses version-check offers into branches.
///
/// The branch is `major.minor`; the first offer of a branch is its latest
/// version. Every branch still offered is supported.
pub(crate) fn parse_branches(json: &str) -> Result<Vec<ReleaseBranch>, ReleaseError> {
    let check: VersionCheck = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    let mut branches = Vec::new();
    for offer in check.offers {
        let Some(captures) = VERSION_RE.captures(&offer.version) else {
            continue;
        };
        let branch = format!("{}.{}", &captures[1], &captures[2]);
        if seen.insert(branch.clone()) {
            branches.push(ReleaseBranch::new(branch, offer.version, true));
        }
    }
    Ok(branches)
}

/// Scrapes archive links from the release page.
pub(crate) fn parse_packages(html: &str) -> ReleasePackages {
    let mut packages = ReleasePackages::new();
    for captures in ARCHIVE_LINK_RE.captures_iter(html) {
        let url = &captures[1];
        let version = &captures[2];
        if IGNORED_VERSIONS.contains(&version) {
            continue;
        }
        let filename = url.rsplit('/').next().unwrap_or(url).to_string();
        packages.insert(
            version.to_string(),
            ReleasePackage {
                url: url.to_string(),
                filename,
            },
        );
    }
    packages
}

#[async_trait]
impl ReleaseMetadataProvider for WordpressReleases {
    fn family(&self) -> &'static str {
        "Wordpress"
    }

    async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError> {
        let body = fetch_text(&self.client, &self.api_url).await?;
        parse_branches(&body)
    }

    async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError> {
        let body = fetch_text(&self.client, &self.releases_url).await?;
        Ok(parse_packages(&body))
    }
}
