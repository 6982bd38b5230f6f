//! Joomla release metadata from the downloads API.

use async_trait::async_trait;
use serde::Deserialize;

use super::http::{fetch_json, fetch_text};
use super::{ReleaseBranch, ReleaseMetadataProvider, ReleasePackage, ReleasePackages};
use crate::error_handling::ReleaseError;

const API_BASE_URL: &str = "https://downloads.joomla.org/api/v1";
const DOWNLOAD_BASE_URL: &str = "https://downloads.joomla.org/cms";

const BRANCH_PREFIX: &str = "Joomla! ";
/// Listed by the API next to the CMS branches, but not CMS releases.
const EXTENSION_BRANCHES: &[&str] = &["Weblinks", "Install from Web"];
const SUPPORTED_BRANCHES: &[&str] = &["Joomla! 3", "Joomla! 4", "Joomla! 5"];
/// Releases whose archives are missing or broken upstream.
const IGNORED_VERSIONS: &[&str] = &["3.1.3", "3.1.2", "2.5.12"];
/// Archive names of early releases that predate the `Full` naming.
const LEGACY_PACKAGE_NAMES: &[&str] = &[
    "Joomla-1.5.0.zip",
    "Joomla_1.0.1-Stable.tar.gz",
    "Joomla_1.0.0-Stable.tar.gz",
];

#[derive(Debug, Deserialize)]
struct LatestResponse {
    branches: Vec<LatestBranch>,
}

#[derive(Debug, Deserialize)]
struct LatestBranch {
    branch: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct ReleasesResponse {
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    branch: String,
    version: String,
    relationships: Relationships,
}

#[derive(Debug, Deserialize)]
struct Relationships {
    signatures: String,
}

#[derive(Debug, Deserialize)]
struct SignaturesResponse {
    files: Vec<SignatureFile>,
}

#[derive(Debug, Deserialize)]
struct SignatureFile {
    filename: String,
}

/// Joomla release provider.
pub struct JoomlaReleases {
    client: reqwest::Client,
    api_base_url: String,
    download_base_url: String,
}

impl JoomlaReleases {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_urls(client, API_BASE_URL, DOWNLOAD_BASE_URL)
    }

    /// Creates a provider reading from a custom API and building download URLs on a custom base.
    pub fn with_urls(
        client: reqwest::Client,
        api_base_url: impl Into<String>,
        download_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            download_base_url: download_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn package_for(&self, release: &Release) -> Result<ReleasePackage, ReleaseError> {
        let signatures: SignaturesResponse =
            fetch_json(&self.client, &release.relationships.signatures).await?;
        let filename = package_name(&signatures.files)
            .ok_or_else(|| ReleaseError::MissingPackageName(release.version.clone()))?;
        let url = download_url(&self.download_base_url, &release.branch, &release.version, filename)?;
        Ok(ReleasePackage {
            url,
            filename: filename.to_string(),
        })
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> &'a str {
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &value[prefix.len()..],
        _ => value,
    }
}

/// Converts the latest-release listing into branches.
fn to_branches(latest: LatestResponse) -> Vec<ReleaseBranch> {
    latest
        .branches
        .into_iter()
        .filter(|b| !EXTENSION_BRANCHES.contains(&b.branch.as_str()))
        .map(|b| {
            let supported = SUPPORTED_BRANCHES.contains(&b.branch.as_str());
            ReleaseBranch::new(
                strip_prefix_ignore_case(&b.branch, BRANCH_PREFIX),
                b.version,
                supported,
            )
        })
        .collect()
}

pub(crate) fn parse_branches(json: &str) -> Result<Vec<ReleaseBranch>, ReleaseError> {
    let latest: LatestResponse = serde_json::from_str(json)?;
    Ok(to_branches(latest))
}

/// Picks the full installation package from a release's file listing.
fn package_name(files: &[SignatureFile]) -> Option<&str> {
    files
        .iter()
        .map(|f| f.filename.as_str())
        .find(|name| name.to_ascii_lowercase().contains("full") || LEGACY_PACKAGE_NAMES.contains(name))
}

/// Builds the archive URL: `<base>/joomla<NN>/<dashed-version>/<file>`.
fn download_url(
    base: &str,
    branch: &str,
    version: &str,
    filename: &str,
) -> Result<String, ReleaseError> {
    let directory = match branch {
        "Joomla! 5" => "5",
        "Joomla! 4" => "4",
        "Joomla! 3" => "3",
        "Joomla! 2.5" => "25",
        "Joomla! 1.5" => "15",
        "Joomla! 1.0" => "10",
        other => {
            return Err(ReleaseError::Parse(format!(
                "no download directory for Joomla branch {}",
                other
            )))
        }
    };
    Ok(format!(
        "{}/joomla{}/{}/{}",
        base,
        directory,
        version.replace('.', "-"),
        filename
    ))
}

#[async_trait]
impl ReleaseMetadataProvider for JoomlaReleases {
    fn family(&self) -> &'static str {
        "Joomla"
    }

    async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError> {
        let url = format!("{}/latest/cms", self.api_base_url);
        let body = fetch_text(&self.client, &url).await?;
        parse_branches(&body)
    }

    /// Every CMS release with its full package.
    ///
    /// Each release needs one extra request for its file listing. A release
    /// whose package cannot be determined is logged and skipped.
    async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError> {
        let url = format!("{}/releases/cms", self.api_base_url);
        let listing: ReleasesResponse = fetch_json(&self.client, &url).await?;

        let mut packages = ReleasePackages::new();
        for release in listing.releases {
            if EXTENSION_BRANCHES.contains(&release.branch.as_str())
                || IGNORED_VERSIONS.contains(&release.version.as_str())
            {
                continue;
            }
            match self.package_for(&release).await {
                Ok(package) => {
                    packages.insert(release.version, package);
                }
                Err(e) => log::warn!("Skipping Joomla {}: {}", release.version, e),
            }
        }
        Ok(packages)
    }
}
