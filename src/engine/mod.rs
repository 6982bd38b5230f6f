//! Fingerprint engine.
//!
//! This module runs the detection part of a scan against a live site:
//! - CMS family detection from identifier file presence
//! - Version narrowing by content hash, with proof-file fallback
//! - Support/freshness classification against release branches
//!
//! Every network request goes through a `ProbeFetcher` and a `ScanContext`,
//! which paces requests and counts outcomes. The algorithms themselves hold
//! no state between calls, so repeated runs against an unchanged site give
//! the same result.

mod context;
mod family;
mod narrowing;
mod result;
mod support;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::candidates::CandidateDatabase;
use crate::config::{FAMILY_MIN_HITS, FAMILY_PROBE_LIMIT};
use crate::releases::ReleaseRegistry;

pub use context::{HttpFetcher, LogObserver, ProbeFetcher, ScanContext, ScanObserver};
pub use family::{choose_family, detect_family, score_families, FamilyScore};
pub use narrowing::{confirm_by_proof, detect_version, narrow_by_identifiers, NarrowingState};
pub use result::ScanResult;
pub use support::{branch_for, classify_support, unclassified, VersionDetails};

/// Detection pipeline for one site against one candidate database.
pub struct FingerprintEngine {
    ctx: ScanContext,
    fetcher: Arc<dyn ProbeFetcher>,
    candidates: Arc<CandidateDatabase>,
    probe_limit: usize,
    min_family_hits: usize,
}

impl FingerprintEngine {
    pub fn new(
        ctx: ScanContext,
        fetcher: Arc<dyn ProbeFetcher>,
        candidates: Arc<CandidateDatabase>,
    ) -> Self {
        Self {
            ctx,
            fetcher,
            candidates,
            probe_limit: FAMILY_PROBE_LIMIT,
            min_family_hits: FAMILY_MIN_HITS,
        }
    }

    /// Overrides the family detection probe limit and hit threshold.
    pub fn with_family_thresholds(mut self, probe_limit: usize, min_family_hits: usize) -> Self {
        self.probe_limit = probe_limit;
        self.min_family_hits = min_family_hits;
        self
    }

    pub fn context(&self) -> &ScanContext {
        &self.ctx
    }

    pub async fn detect_family(&self) -> Option<String> {
        detect_family(
            &self.ctx,
            self.fetcher.as_ref(),
            &self.candidates,
            self.probe_limit,
            self.min_family_hits,
        )
        .await
    }

    /// Candidate versions of a family; empty for a family missing from the database.
    pub async fn detect_version(&self, family: &str) -> Vec<String> {
        match self.candidates.family(family) {
            Some(candidates) => detect_version(&self.ctx, self.fetcher.as_ref(), candidates).await,
            None => Vec::new(),
        }
    }

    /// Runs family detection, version narrowing and support classification.
    ///
    /// When the registry has no provider for the detected family, or the
    /// provider fails, the versions are reported with unknown support.
    pub async fn scan(&self, releases: &ReleaseRegistry) -> ScanResult {
        let Some(family) = self.detect_family().await else {
            return ScanResult::undetected();
        };

        log::info!("Detecting version of {}", family);
        let versions = self.detect_version(&family).await;
        if versions.is_empty() {
            return ScanResult::family_only(family);
        }

        let details = match releases.get(&family) {
            Some(provider) => match provider.latest_branches().await {
                Ok(branches) => classify_support(&branches, &versions),
                Err(e) => {
                    log::warn!("Could not fetch release branches of {}: {}", family, e);
                    unclassified(&versions)
                }
            },
            None => {
                log::warn!("No release metadata provider for {}", family);
                unclassified(&versions)
            }
        };

        let stats = self.ctx.stats();
        log::info!(
            "Scan of {} finished after {} probes ({} failed)",
            self.ctx.base_url(),
            stats.total_probes(),
            stats.total_failures()
        );

        ScanResult {
            cms: Some(family),
            versions: details,
        }
    }
}
