//! Severity classification of a scan result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::engine::{ScanResult, VersionDetails};
use crate::version::sort_versions;

/// Severity attached to a report test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Success,
    Info,
    Warning,
    Critical,
}

/// Outcome categories of a scan, in decision order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Verdict {
    /// No CMS family recognized
    CmsUndetected,
    /// Family recognized, version undetermined
    VersionUndetected,
    /// One version, supported and newest in its branch
    UpToDate,
    /// Supported but outdated candidates, none current
    Outdated,
    /// Unsupported candidates, none current
    OutOfSupport,
    /// One current candidate among outdated ones
    MightBeUpToDate,
    /// None of the above, usually because release metadata was unavailable
    SupportUnknown,
}

impl Verdict {
    /// Translation key understood by report consumers.
    pub fn translation_id(&self) -> &'static str {
        match self {
            Verdict::CmsUndetected => "CMS_CANT_DETECT_CMS",
            Verdict::VersionUndetected => "CMS_CANT_DETECT_VERSION",
            Verdict::UpToDate => "CMS_UPTODATE",
            Verdict::Outdated => "CMS_OUTDATED",
            Verdict::OutOfSupport => "CMS_OUT_OF_SUPPORT",
            Verdict::MightBeUpToDate => "CMS_MIGHT_UPTODATE",
            Verdict::SupportUnknown => "CMS_SUPPORT_UNKNOWN",
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            Verdict::Outdated | Verdict::OutOfSupport => 0,
            Verdict::MightBeUpToDate => 90,
            _ => 100,
        }
    }

    pub fn score_type(&self) -> ScoreType {
        match self {
            Verdict::UpToDate => ScoreType::Success,
            Verdict::Outdated | Verdict::MightBeUpToDate => ScoreType::Warning,
            Verdict::OutOfSupport => ScoreType::Critical,
            Verdict::CmsUndetected | Verdict::VersionUndetected | Verdict::SupportUnknown => {
                ScoreType::Info
            }
        }
    }
}

/// A verdict plus the values needed to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub placeholders: BTreeMap<String, String>,
}

impl Classification {
    fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            placeholders: BTreeMap::new(),
        }
    }

    fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.placeholders.insert(key.to_string(), value.into());
        self
    }
}

/// Maps a scan result to its report verdict.
///
/// Rules are checked in `Verdict` order and the first match wins. Version
/// data is ignored entirely when no family was recognized.
pub fn classify(result: &ScanResult) -> Classification {
    let Some(cms) = result.cms.as_deref() else {
        return Classification::new(Verdict::CmsUndetected);
    };

    if result.versions.is_empty() {
        return Classification::new(Verdict::VersionUndetected).with("cms", cms);
    }

    let mut ordered: Vec<String> = result.versions.keys().cloned().collect();
    sort_versions(&mut ordered);
    let all_versions = ordered.join(", ");

    let count = |f: fn(&VersionDetails) -> bool| result.versions.values().filter(|d| f(d)).count();
    let current = count(VersionDetails::is_current);
    let outdated = count(VersionDetails::is_outdated);
    let unsupported = count(VersionDetails::is_unsupported);

    let verdict = if result.versions.len() == 1 && current == 1 {
        Verdict::UpToDate
    } else if current == 0 && outdated > 0 {
        Verdict::Outdated
    } else if current == 0 && unsupported > 0 {
        Verdict::OutOfSupport
    } else if current == 1 && outdated > 0 {
        Verdict::MightBeUpToDate
    } else {
        Verdict::SupportUnknown
    };

    let classification = Classification::new(verdict)
        .with("cms", cms)
        .with("version", all_versions);

    match verdict {
        Verdict::Outdated => {
            let latest = ordered
                .iter()
                .filter_map(|v| result.versions.get(v))
                .find(|d| d.is_outdated())
                .and_then(|d| d.latest_in_branch.clone())
                .unwrap_or_default();
            classification.with("latest", latest)
        }
        _ => classification,
    }
}
