//! Version narrowing.
//!
//! Phase A walks the identifier files in score order and intersects the
//! version buckets of every recognized hash. Phase B runs only when more
//! than one candidate survives: it requests the proof files of the remaining
//! versions and returns the first version whose proof matches.

use crate::candidates::FamilyCandidates;
use crate::engine::context::{ProbeFetcher, ScanContext};

/// Running state of Phase A.
///
/// `candidates` is `None` until the first multi-version bucket is seen. It
/// never grows afterwards; an intersection that comes out empty stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrowingState {
    pub candidates: Option<Vec<String>>,
    pub resolved: Option<String>,
}

impl NarrowingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one matched hash bucket into the state.
    ///
    /// A single-version bucket resolves immediately. Otherwise the bucket
    /// seeds or intersects the running set, resolving when exactly one
    /// version is left. Intersection keeps the running set's order.
    pub fn apply(self, bucket: &[String]) -> Self {
        if self.resolved.is_some() {
            return self;
        }

        if let [only] = bucket {
            return Self {
                candidates: Some(vec![only.clone()]),
                resolved: Some(only.clone()),
            };
        }

        let candidates = match self.candidates {
            None => bucket.to_vec(),
            Some(running) => running
                .into_iter()
                .filter(|v| bucket.contains(v))
                .collect(),
        };

        let resolved = match candidates.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };

        Self {
            candidates: Some(candidates),
            resolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Versions still possible; empty before the first bucket.
    pub fn remaining(&self) -> &[String] {
        self.candidates.as_deref().unwrap_or(&[])
    }
}

/// Phase A: narrows the candidates with the identifier files.
pub async fn narrow_by_identifiers(
    ctx: &ScanContext,
    fetcher: &dyn ProbeFetcher,
    family: &FamilyCandidates,
) -> NarrowingState {
    let mut state = NarrowingState::new();

    for identifier in &family.identifier {
        let Some(hash) = ctx.probe_hash(fetcher, &identifier.path).await else {
            continue;
        };

        let Some(bucket) = identifier.versions_for(&hash) else {
            log::debug!("Unknown hash {} for {}", hash, identifier.path);
            continue;
        };

        state = state.apply(bucket);
        ctx.observer()
            .candidates_narrowed(&identifier.path, state.remaining());

        if state.is_resolved() {
            break;
        }
    }

    state
}

/// Phase B: confirms one of the remaining versions with its proof files.
///
/// Versions are tried in running-set order; the first version with a
/// matching proof file wins.
pub async fn confirm_by_proof(
    ctx: &ScanContext,
    fetcher: &dyn ProbeFetcher,
    family: &FamilyCandidates,
    remaining: &[String],
) -> Option<String> {
    for version in remaining {
        let Some(files) = family.proof_for(version) else {
            continue;
        };

        for (path, expected) in files {
            if ctx.probe_hash(fetcher, path).await.as_deref() == Some(expected.as_str()) {
                log::info!("Version {} confirmed by {}", version, path);
                return Some(version.clone());
            }
        }
    }
    None
}

/// Detects the version of an already recognized family.
///
/// Returns one version when narrowing or a proof resolves it, several when
/// the ambiguity cannot be reduced, and none when no identifier file could
/// be matched.
pub async fn detect_version(
    ctx: &ScanContext,
    fetcher: &dyn ProbeFetcher,
    family: &FamilyCandidates,
) -> Vec<String> {
    let state = narrow_by_identifiers(ctx, fetcher, family).await;

    if let Some(version) = state.resolved {
        return vec![version];
    }

    let remaining = state.candidates.unwrap_or_default();
    if remaining.len() > 1 {
        if let Some(version) = confirm_by_proof(ctx, fetcher, family, &remaining).await {
            return vec![version];
        }
    }

    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{IdentifierCandidate, VersionProof};
    use crate::engine::testing::StaticFetcher;
    use crate::signature::{content_hash, HashBuckets};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    const SITE: &str = "https://example.org/";

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    /// Identifier whose buckets are keyed by the hash of the given content.
    fn identifier(path: &str, buckets: &[(&str, &[&str])]) -> IdentifierCandidate {
        let hash_table: HashBuckets = buckets
            .iter()
            .map(|(content, members)| (content_hash(content.as_bytes()), versions(members)))
            .collect();
        IdentifierCandidate {
            path: path.to_string(),
            score: 1.0,
            hash_table,
        }
    }

    fn url(path: &str) -> String {
        format!("{}{}", SITE, path)
    }

    fn ctx() -> ScanContext {
        ScanContext::new(SITE, Duration::ZERO)
    }

    #[test]
    fn test_apply_seeds_then_intersects() {
        let state = NarrowingState::new()
            .apply(&versions(&["5.2.0", "5.2.1"]))
            .apply(&versions(&["5.2.1", "5.2.2"]));
        assert_eq!(state.resolved, Some("5.2.1".to_string()));
    }

    #[test]
    fn test_apply_keeps_empty_intersection() {
        let state = NarrowingState::new()
            .apply(&versions(&["1.0", "1.1"]))
            .apply(&versions(&["2.0", "2.1"]));
        assert_eq!(state.candidates, Some(vec![]));
        assert!(!state.is_resolved());

        // later evidence cannot revive an emptied running set
        let state = state.apply(&versions(&["1.0", "1.1"]));
        assert_eq!(state.remaining(), &[] as &[String]);
    }

    #[test]
    fn test_apply_single_bucket_resolves_regardless_of_running_set() {
        let state = NarrowingState::new()
            .apply(&versions(&["1.0", "1.1"]))
            .apply(&versions(&["3.0"]));
        assert_eq!(state.resolved, Some("3.0".to_string()));
    }

    #[tokio::test]
    async fn test_unique_hash_returns_without_consulting_other_files() {
        let family = FamilyCandidates {
            identifier: vec![
                identifier("a.js", &[("A520", &["5.2.0"]), ("A521", &["5.2.1"])]),
                identifier("b.js", &[("B", &["5.2.0", "5.2.1"])]),
            ],
            versionproof: BTreeMap::new(),
        };
        let fetcher = StaticFetcher::new(&[(&url("a.js"), "A520"), (&url("b.js"), "B")]);

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert_eq!(result, versions(&["5.2.0"]));
        assert_eq!(fetcher.requests(), vec![url("a.js")]);
    }

    #[tokio::test]
    async fn test_intersection_resolves_after_second_file() {
        let family = FamilyCandidates {
            identifier: vec![
                identifier("a.js", &[("A", &["5.2.0", "5.2.1"])]),
                identifier("b.js", &[("B", &["5.2.1", "5.2.2"])]),
                identifier("c.js", &[("C", &["5.2.1", "5.2.2"])]),
            ],
            versionproof: BTreeMap::new(),
        };
        let fetcher = StaticFetcher::new(&[
            (&url("a.js"), "A"),
            (&url("b.js"), "B"),
            (&url("c.js"), "C"),
        ]);

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert_eq!(result, versions(&["5.2.1"]));
        assert_eq!(fetcher.requests(), vec![url("a.js"), url("b.js")]);
    }

    #[tokio::test]
    async fn test_unreachable_files_yield_empty_result() {
        let family = FamilyCandidates {
            identifier: vec![
                identifier("a.js", &[("A", &["1.0"])]),
                identifier("b.js", &[("B", &["1.0", "1.1"])]),
            ],
            versionproof: BTreeMap::from([(
                "1.0".to_string(),
                VersionProof::Files(BTreeMap::from([("a.js".to_string(), "x".to_string())])),
            )]),
        };
        let fetcher = StaticFetcher::empty();

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_hash_is_skipped() {
        let family = FamilyCandidates {
            identifier: vec![
                identifier("a.js", &[("A", &["1.0"])]),
                identifier("b.js", &[("B", &["1.1"])]),
            ],
            versionproof: BTreeMap::new(),
        };
        let fetcher = StaticFetcher::new(&[(&url("a.js"), "patched"), (&url("b.js"), "B")]);

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert_eq!(result, versions(&["1.1"]));
    }

    #[tokio::test]
    async fn test_proof_fallback_confirms_version() {
        let family = FamilyCandidates {
            identifier: vec![identifier("a.js", &[("A", &["4.0", "4.1", "4.2"])])],
            versionproof: BTreeMap::from([
                ("4.0".to_string(), VersionProof::Unavailable),
                (
                    "4.1".to_string(),
                    VersionProof::Files(BTreeMap::from([(
                        "p41.css".to_string(),
                        content_hash(b"P41"),
                    )])),
                ),
                (
                    "4.2".to_string(),
                    VersionProof::Files(BTreeMap::from([(
                        "p42.css".to_string(),
                        content_hash(b"P42"),
                    )])),
                ),
            ]),
        };
        let fetcher = StaticFetcher::new(&[
            (&url("a.js"), "A"),
            (&url("p41.css"), "something else"),
            (&url("p42.css"), "P42"),
        ]);

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert_eq!(result, versions(&["4.2"]));
    }

    #[tokio::test]
    async fn test_first_confirmed_version_in_running_order_wins() {
        // running set order is "4.10" then "4.9"; the newer release is not preferred
        let family = FamilyCandidates {
            identifier: vec![identifier("a.js", &[("A", &["4.10", "4.9"])])],
            versionproof: BTreeMap::from([
                (
                    "4.10".to_string(),
                    VersionProof::Files(BTreeMap::from([(
                        "p10.css".to_string(),
                        content_hash(b"P10"),
                    )])),
                ),
                (
                    "4.9".to_string(),
                    VersionProof::Files(BTreeMap::from([(
                        "p9.css".to_string(),
                        content_hash(b"P9"),
                    )])),
                ),
            ]),
        };
        let fetcher = StaticFetcher::new(&[
            (&url("a.js"), "A"),
            (&url("p10.css"), "P10"),
            (&url("p9.css"), "P9"),
        ]);

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert_eq!(result, versions(&["4.10"]));
        assert_eq!(fetcher.requests(), vec![url("a.js"), url("p10.css")]);
    }

    #[tokio::test]
    async fn test_ambiguous_result_when_no_proof_matches() {
        let family = FamilyCandidates {
            identifier: vec![identifier("a.js", &[("A", &["4.0", "4.1"])])],
            versionproof: BTreeMap::from([
                ("4.0".to_string(), VersionProof::Unavailable),
                ("4.1".to_string(), VersionProof::Unavailable),
            ]),
        };
        let fetcher = StaticFetcher::new(&[(&url("a.js"), "A")]);

        let result = detect_version(&ctx(), &fetcher, &family).await;
        assert_eq!(result, versions(&["4.0", "4.1"]));
    }

    #[tokio::test]
    async fn test_detect_version_is_repeatable() {
        let family = FamilyCandidates {
            identifier: vec![
                identifier("a.js", &[("A", &["1.0", "1.1", "1.2"])]),
                identifier("b.js", &[("B", &["1.1", "1.2"])]),
            ],
            versionproof: BTreeMap::new(),
        };
        let fetcher = StaticFetcher::new(&[(&url("a.js"), "A"), (&url("b.js"), "B")]);
        let ctx = ctx();

        let first = detect_version(&ctx, &fetcher, &family).await;
        let second = detect_version(&ctx, &fetcher, &family).await;
        assert_eq!(first, versions(&["1.1", "1.2"]));
        assert_eq!(first, second);
    }

    fn arb_bucket() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(0u8..8, 2..6)
            .prop_map(|set| set.into_iter().map(|v| format!("1.{}", v)).collect())
    }

    proptest! {
        #[test]
        fn prop_running_set_never_grows(buckets in prop::collection::vec(arb_bucket(), 1..8)) {
            let mut state = NarrowingState::new();
            let mut previous: Option<usize> = None;
            for bucket in &buckets {
                state = state.apply(bucket);
                let size = state.remaining().len();
                if let Some(previous) = previous {
                    prop_assert!(size <= previous);
                }
                previous = Some(size);
                if state.is_resolved() {
                    break;
                }
            }
        }
    }
}
