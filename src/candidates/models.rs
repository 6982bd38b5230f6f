//! Data structures for the candidate database.
//!
//! This module contains the structures the runtime engine consumes:
//! - `IdentifierCandidate`: a probe file with its discriminating score and hash buckets
//! - `VersionProof`: the file(s) whose hash is unique to one version, or no proof
//! - `FamilyCandidates`: identifier list plus proof set for one CMS family
//! - `CandidateDatabase`: all families, as read from `candidates.json`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::signature::HashBuckets;

/// A probe file ranked by how well it discriminates between versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierCandidate {
    /// Root-relative path of the file on the target site
    pub path: String,
    /// Discriminating score, higher probes first
    pub score: f64,
    /// Content hash → versions that shipped it
    #[serde(rename = "hashTable")]
    pub hash_table: HashBuckets,
}

impl IdentifierCandidate {
    /// Versions that shipped the given content hash, if the hash is known.
    pub fn versions_for(&self, hash: &str) -> Option<&[String]> {
        self.hash_table.get(hash).map(Vec::as_slice)
    }
}

/// Proof entry for one version.
///
/// Serialized as a `{path: hash}` object, or as `false` when no file's hash
/// is unique to the version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionProof {
    /// Root-relative path → hash unique to this version
    Files(BTreeMap<String, String>),
    /// No file fingerprints this version on its own
    Unavailable,
}

impl VersionProof {
    pub fn files(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            VersionProof::Files(files) => Some(files),
            VersionProof::Unavailable => None,
        }
    }
}

impl Serialize for VersionProof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            VersionProof::Files(files) => files.serialize(serializer),
            VersionProof::Unavailable => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for VersionProof {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};
        use std::fmt;

        struct VersionProofVisitor;

        impl<'de> Visitor<'de> for VersionProofVisitor {
            type Value = VersionProof;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of file paths to hashes, or false")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value {
                    Err(E::invalid_value(de::Unexpected::Bool(true), &self))
                } else {
                    Ok(VersionProof::Unavailable)
                }
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(VersionProof::Unavailable)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut files = BTreeMap::new();
                while let Some((path, hash)) = map.next_entry::<String, String>()? {
                    files.insert(path, hash);
                }
                if files.is_empty() {
                    Ok(VersionProof::Unavailable)
                } else {
                    Ok(VersionProof::Files(files))
                }
            }
        }

        deserializer.deserialize_any(VersionProofVisitor)
    }
}

/// Candidate sets of one CMS family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyCandidates {
    /// Probe files, highest score first
    pub identifier: Vec<IdentifierCandidate>,
    /// Version → proof
    #[serde(default)]
    pub versionproof: BTreeMap<String, VersionProof>,
}

impl FamilyCandidates {
    /// Proof files of one version, if it has a proof.
    pub fn proof_for(&self, version: &str) -> Option<&BTreeMap<String, String>> {
        self.versionproof.get(version).and_then(VersionProof::files)
    }

    /// Number of versions without a proof.
    pub fn proofless_count(&self) -> usize {
        self.versionproof
            .values()
            .filter(|p| matches!(p, VersionProof::Unavailable))
            .count()
    }
}

/// Candidate database across all families.
///
/// Families are kept in a sorted map, so every pass over them (and every
/// tie between them) follows family-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateDatabase {
    pub families: BTreeMap<String, FamilyCandidates>,
}

impl CandidateDatabase {
    pub fn family(&self, name: &str) -> Option<&FamilyCandidates> {
        self.families.get(name)
    }
}
