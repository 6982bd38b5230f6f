//! Accumulated signature database.
//!
//! The database maps CMS family → file path → content hash → versions that
//! shipped that content. It grows by one family/version slice per ingestion
//! and never shrinks except by an explicit rebuild.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::version::{compare_versions, sort_versions};

/// Hash buckets of one file: content hash → versions, oldest first.
pub type HashBuckets = BTreeMap<String, Vec<String>>;

/// Signatures of one CMS family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilySignatures {
    /// File path → hash buckets
    #[serde(default)]
    pub hashes: BTreeMap<String, HashBuckets>,
    /// Every ingested version, oldest first
    #[serde(default)]
    pub versions: Vec<String>,
}

impl FamilySignatures {
    /// Returns true if the version has already been ingested.
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// Number of ingested versions.
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Adds one release's `{path → hash}` signatures.
    ///
    /// Each version appears at most once per bucket and buckets stay sorted
    /// oldest first. Re-ingesting a known version is a no-op and returns false.
    pub fn ingest(&mut self, version: &str, signatures: &BTreeMap<String, String>) -> bool {
        if self.has_version(version) {
            return false;
        }

        for (path, hash) in signatures {
            let bucket = self
                .hashes
                .entry(path.clone())
                .or_default()
                .entry(hash.clone())
                .or_default();

            if !bucket.iter().any(|v| v == version) {
                let position = bucket
                    .iter()
                    .position(|v| compare_versions(v, version).is_gt())
                    .unwrap_or(bucket.len());
                bucket.insert(position, version.to_string());
            }
        }

        self.versions.push(version.to_string());
        sort_versions(&mut self.versions);
        true
    }
}

/// Signature database across all families.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureDatabase {
    pub families: BTreeMap<String, FamilySignatures>,
}

impl SignatureDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signatures of one family, if any were ingested.
    pub fn family(&self, name: &str) -> Option<&FamilySignatures> {
        self.families.get(name)
    }

    /// Signatures of one family, created empty on first use.
    pub fn family_mut(&mut self, name: &str) -> &mut FamilySignatures {
        self.families.entry(name.to_string()).or_default()
    }
}
