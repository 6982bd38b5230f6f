//! TYPO3 release metadata from get.typo3.org.
//!
//! The JSON document mixes branch objects with plain summary fields
//! (`latest_stable`, `latest_lts`, ...). Only the branch objects are used.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::http::fetch_json;
use super::{ReleaseBranch, ReleaseMetadataProvider, ReleasePackage, ReleasePackages};
use crate::error_handling::ReleaseError;

const RELEASES_URL: &str = "https://get.typo3.org/json";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Branch(Branch),
    #[allow(dead_code)]
    Summary(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct Branch {
    latest: String,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    releases: BTreeMap<String, Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    url: Option<ReleaseUrls>,
}

#[derive(Debug, Deserialize)]
struct ReleaseUrls {
    #[serde(default)]
    tar: Option<String>,
}

type Document = BTreeMap<String, Entry>;

fn branches(document: Document) -> impl Iterator<Item = (String, Branch)> {
    document.into_iter().filter_map(|(name, entry)| match entry {
        Entry::Branch(branch) => Some((name, branch)),
        Entry::Summary(_) => None,
    })
}

/// TYPO3 release provider.
pub struct Typo3Releases {
    client: reqwest::Client,
    url: String,
}

impl Typo3Releases {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, RELEASES_URL)
    }

    /// Creates a provider reading the release document from a custom URL.
    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

fn to_branches(document: Document) -> Vec<ReleaseBranch> {
    branches(document)
        .map(|(name, branch)| ReleaseBranch::new(name, branch.latest, branch.active))
        .collect()
}

/// Collects the tarball of every release; the archive is stored as `<version>.tgz`.
fn to_packages(document: Document) -> ReleasePackages {
    let mut packages = ReleasePackages::new();
    for (_, branch) in branches(document) {
        for (version, release) in branch.releases {
            let Some(tar) = release.url.and_then(|u| u.tar) else {
                log::debug!("TYPO3 {} has no tarball", version);
                continue;
            };
            let filename = format!("{}.tgz", version);
            packages.insert(version, ReleasePackage { url: tar, filename });
        }
    }
    packages
}

#[async_trait]
impl ReleaseMetadataProvider for Typo3Releases {
    fn family(&self) -> &'static str {
        "Typo3"
    }

    async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError> {
        let document: Document = fetch_json(&self.client, &self.url).await?;
        Ok(to_branches(document))
    }

    async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError> {
        let document: Document = fetch_json(&self.client, &self.url).await?;
        Ok(to_packages(document))
    }
}
