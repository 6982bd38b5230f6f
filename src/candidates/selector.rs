//! Candidate selection.
//!
//! Turns the signatures of one CMS family into the two sets the runtime
//! engine consumes:
//! - the identifier set: every tracked file, ranked by discriminating power
//! - the proof set: per version, a file whose hash only that version shipped

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::candidates::models::{FamilyCandidates, IdentifierCandidate, VersionProof};
use crate::error_handling::SelectorError;
use crate::signature::{FamilySignatures, HashBuckets};

/// Scores one file's hash buckets.
///
/// `score = version-hash pairs / versionCount + distinct buckets / versionCount`
fn score(buckets: &HashBuckets, version_count: usize) -> f64 {
    let pairs: usize = buckets.values().map(Vec::len).sum();
    let count = version_count as f64;
    pairs as f64 / count + buckets.len() as f64 / count
}

/// Ranks every file of a family by discriminating score, highest first.
///
/// Files are visited in path order and the sort is stable, so equal scores
/// keep path order.
///
/// # Errors
///
/// Returns `SelectorError::InvalidInput` if there are no signatures or
/// `version_count` is zero.
pub fn identifier_candidates(
    signatures: &BTreeMap<String, HashBuckets>,
    version_count: usize,
) -> Result<Vec<IdentifierCandidate>, SelectorError> {
    validate(signatures, version_count)?;

    let mut candidates: Vec<IdentifierCandidate> = signatures
        .iter()
        .map(|(path, buckets)| IdentifierCandidate {
            path: path.clone(),
            score: score(buckets, version_count),
            hash_table: buckets.clone(),
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    Ok(candidates)
}

/// Finds, for every version, the first file whose hash bucket holds only that version.
///
/// Versions without such a file map to `VersionProof::Unavailable`.
pub fn version_proofs(
    signatures: &BTreeMap<String, HashBuckets>,
    versions: &[String],
) -> BTreeMap<String, VersionProof> {
    versions
        .iter()
        .map(|version| {
            let proof = signatures
                .iter()
                .find_map(|(path, buckets)| {
                    buckets
                        .iter()
                        .find(|(_, members)| members.len() == 1 && members[0] == *version)
                        .map(|(hash, _)| (path.clone(), hash.clone()))
                })
                .map(|(path, hash)| VersionProof::Files(BTreeMap::from([(path, hash)])))
                .unwrap_or(VersionProof::Unavailable);
            (version.clone(), proof)
        })
        .collect()
}

/// Builds the identifier and proof sets of one family.
///
/// The identifier list is truncated to `limit` entries; the proof set covers
/// every known version.
///
/// # Errors
///
/// Returns `SelectorError::InvalidInput` if the family has no signatures or no versions.
pub fn build_candidates(
    family: &FamilySignatures,
    limit: usize,
) -> Result<FamilyCandidates, SelectorError> {
    let mut identifier = identifier_candidates(&family.hashes, family.version_count())?;
    identifier.truncate(limit);

    Ok(FamilyCandidates {
        identifier,
        versionproof: version_proofs(&family.hashes, &family.versions),
    })
}

fn validate(
    signatures: &BTreeMap<String, HashBuckets>,
    version_count: usize,
) -> Result<(), SelectorError> {
    if signatures.is_empty() {
        return Err(SelectorError::InvalidInput("no signatures"));
    }
    if version_count == 0 {
        return Err(SelectorError::InvalidInput("version count is zero"));
    }
    Ok(())
}
