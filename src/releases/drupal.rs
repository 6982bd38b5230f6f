//! Drupal release metadata, read from the XML release history feed.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::http::fetch_text;
use super::{ReleaseBranch, ReleaseMetadataProvider, ReleasePackage, ReleasePackages};
use crate::error_handling::ReleaseError;
use crate::version::compare_versions;

const RELEASE_HISTORY_URL: &str = "https://updates.drupal.org/release-history/drupal/all";

/// Last day of Drupal 7 extended support.
const DRUPAL7_END_OF_LIFE: (i32, u32, u32) = (2025, 1, 5);

#[derive(Debug, Deserialize)]
struct Project {
    #[serde(default)]
    releases: Releases,
}

#[derive(Debug, Default, Deserialize)]
struct Releases {
    #[serde(rename = "release", default)]
    release: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    version: String,
    #[serde(default)]
    version_major: Option<String>,
    #[serde(default)]
    version_minor: Option<String>,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    terms: Option<Terms>,
}

#[derive(Debug, Default, Deserialize)]
struct Terms {
    #[serde(default)]
    term: Vec<Term>,
}

#[derive(Debug, Default, Deserialize)]
struct Term {}

impl Release {
    fn is_dev(&self) -> bool {
        self.version.to_ascii_lowercase().contains("-dev")
    }

    fn has_terms(&self) -> bool {
        self.terms.as_ref().is_some_and(|t| !t.term.is_empty())
    }

    fn major(&self) -> Option<&str> {
        self.version_major.as_deref().filter(|s| !s.is_empty())
    }

    fn minor(&self) -> Option<&str> {
        self.version_minor.as_deref().filter(|s| !s.is_empty())
    }
}

/// Drupal release provider.
pub struct DrupalReleases {
    client: reqwest::Client,
    history_url: String,
}

impl DrupalReleases {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, RELEASE_HISTORY_URL)
    }

    /// Creates a provider reading the release history from a custom URL.
    pub fn with_url(client: reqwest::Client, history_url: impl Into<String>) -> Self {
        Self {
            client,
            history_url: history_url.into(),
        }
    }
}

fn parse_project(xml: &str) -> Result<Project, ReleaseError> {
    quick_xml::de::from_str(xml).map_err(|e| ReleaseError::Parse(e.to_string()))
}

struct BranchEntry {
    label: String,
    version: String,
    major: u32,
    minor: u32,
    supported: bool,
}

/// Parses the release history into branches.
///
/// Development snapshots and releases without release-type terms are
/// skipped. Each `major.minor` branch keeps its highest version. Drupal 7 is
/// supported until the end of its extended support; from Drupal 8 on a
/// branch is supported as long as no next minor branch exists.
pub(crate) fn parse_branches(
    xml: &str,
    today: NaiveDate,
) -> Result<Vec<ReleaseBranch>, ReleaseError> {
    let project = parse_project(xml)?;
    let (y, m, d) = DRUPAL7_END_OF_LIFE;
    let drupal7_supported = NaiveDate::from_ymd_opt(y, m, d).is_some_and(|eol| today <= eol);

    let mut entries: Vec<BranchEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for release in project.releases.release {
        if release.is_dev() || !release.has_terms() {
            continue;
        }
        let Some(major) = release.major() else {
            continue;
        };
        let label = format!("{}.{}", major, release.minor().unwrap_or("0"));
        let major_number: u32 = major.parse().unwrap_or(0);

        let entry = BranchEntry {
            label: label.clone(),
            version: release.version.clone(),
            major: major_number,
            minor: release.minor().and_then(|m| m.parse().ok()).unwrap_or(0),
            supported: major_number == 7 && drupal7_supported,
        };

        match index.get(&label) {
            Some(&i) => {
                if compare_versions(&entries[i].version, &entry.version).is_lt() {
                    entries[i] = entry;
                }
            }
            None => {
                index.insert(label, entries.len());
                entries.push(entry);
            }
        }
    }

    let labels: HashSet<String> = entries.iter().map(|e| e.label.clone()).collect();
    for entry in entries.iter_mut().filter(|e| e.major >= 8) {
        let next_minor = format!("{}.{}", entry.major, entry.minor + 1);
        if !labels.contains(&next_minor) {
            entry.supported = true;
        }
    }

    Ok(entries
        .into_iter()
        .map(|e| ReleaseBranch::new(e.label, e.version, e.supported))
        .collect())
}

/// Parses the release history into downloadable packages, skipping development snapshots.
pub(crate) fn parse_packages(xml: &str) -> Result<ReleasePackages, ReleaseError> {
    let project = parse_project(xml)?;
    let mut packages = ReleasePackages::new();

    for release in project.releases.release {
        if release.is_dev() {
            continue;
        }
        let Some(link) = release.download_link.filter(|l| !l.is_empty()) else {
            log::debug!("Drupal {} has no download link", release.version);
            continue;
        };
        let filename = link.rsplit('/').next().unwrap_or(&link).to_string();
        packages.insert(
            release.version,
            ReleasePackage {
                url: link,
                filename,
            },
        );
    }
    Ok(packages)
}

#[async_trait]
impl ReleaseMetadataProvider for DrupalReleases {
    fn family(&self) -> &'static str {
        "Drupal"
    }

    async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError> {
        let body = fetch_text(&self.client, &self.history_url).await?;
        parse_branches(&body, chrono::Local::now().date_naive())
    }

    async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError> {
        let body = fetch_text(&self.client, &self.history_url).await?;
        parse_packages(&body)
    }
}
