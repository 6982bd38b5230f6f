//! Support and freshness classification of detected versions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::releases::ReleaseBranch;
use crate::version::is_at_least;

/// Support status of one detected version.
///
/// All fields stay `None` when no release branch matches the version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDetails {
    pub is_latest: Option<bool>,
    pub latest_in_branch: Option<String>,
    pub supported: Option<bool>,
}

impl VersionDetails {
    pub fn is_known(&self) -> bool {
        self.supported.is_some()
    }

    /// Supported and newest in its branch.
    pub fn is_current(&self) -> bool {
        self.supported == Some(true) && self.is_latest == Some(true)
    }

    /// Supported but behind its branch.
    pub fn is_outdated(&self) -> bool {
        self.supported == Some(true) && self.is_latest == Some(false)
    }

    pub fn is_unsupported(&self) -> bool {
        self.supported == Some(false)
    }
}

/// First branch, in provider order, whose label prefixes the version.
pub fn branch_for<'a>(branches: &'a [ReleaseBranch], version: &str) -> Option<&'a ReleaseBranch> {
    branches.iter().find(|b| version.starts_with(b.branch.as_str()))
}

/// Classifies every detected version against the release branches.
pub fn classify_support(
    branches: &[ReleaseBranch],
    versions: &[String],
) -> BTreeMap<String, VersionDetails> {
    versions
        .iter()
        .map(|version| {
            let details = match branch_for(branches, version) {
                Some(branch) => {
                    log::info!("Found branch {} for version {}", branch.branch, version);
                    VersionDetails {
                        is_latest: Some(is_at_least(version, &branch.latest_version)),
                        latest_in_branch: Some(branch.latest_version.clone()),
                        supported: Some(branch.supported),
                    }
                }
                None => {
                    log::info!("No release branch matches version {}", version);
                    VersionDetails::default()
                }
            };
            (version.clone(), details)
        })
        .collect()
}

/// Versions with unknown support, used when release metadata is unavailable.
pub fn unclassified(versions: &[String]) -> BTreeMap<String, VersionDetails> {
    versions
        .iter()
        .map(|v| (v.clone(), VersionDetails::default()))
        .collect()
}
