//! Per-scan probe statistics.
//!
//! Counts successful and failed probes by failure category. One instance is
//! owned by each `ScanContext`; nothing here is process-wide.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;

use super::types::ProbeFailure;

/// Thread-safe probe statistics tracker.
///
/// All failure categories are initialized to zero on creation, so lookups
/// never miss.
pub struct ProbeStats {
    hits: AtomicUsize,
    failures: HashMap<ProbeFailure, AtomicUsize>,
}

impl Default for ProbeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeStats {
    pub fn new() -> Self {
        let failures = ProbeFailure::iter()
            .map(|failure| (failure, AtomicUsize::new(0)))
            .collect();

        ProbeStats {
            hits: AtomicUsize::new(0),
            failures,
        }
    }

    /// Records a probe that returned a success response.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed probe.
    pub fn record_failure(&self, failure: ProbeFailure) {
        if let Some(counter) = self.failures.get(&failure) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Probe failure {:?} is missing from the stats map. \
                 This indicates a bug in ProbeStats initialization.",
                failure
            );
        }
    }

    /// Number of probes that returned a success response.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Number of failed probes of one category.
    pub fn get_failure_count(&self, failure: ProbeFailure) -> usize {
        self.failures
            .get(&failure)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of failed probes across all categories.
    pub fn total_failures(&self) -> usize {
        ProbeFailure::iter()
            .map(|f| self.get_failure_count(f))
            .sum()
    }

    /// Total number of probes sent.
    pub fn total_probes(&self) -> usize {
        self.hits() + self.total_failures()
    }
}
