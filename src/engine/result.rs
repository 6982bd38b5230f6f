//! Outcome of one scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::support::VersionDetails;

/// Detected CMS family and candidate versions.
///
/// - `cms == None`: no family recognized
/// - `cms` set, `versions` empty: family known, version undetermined
/// - more than one version: the ambiguity could not be reduced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub cms: Option<String>,
    pub versions: BTreeMap<String, VersionDetails>,
}

impl ScanResult {
    pub fn undetected() -> Self {
        Self::default()
    }

    pub fn family_only(cms: impl Into<String>) -> Self {
        Self {
            cms: Some(cms.into()),
            versions: BTreeMap::new(),
        }
    }
}
