//! Error handling and probe statistics.
//!
//! This module provides:
//! - Error type definitions for every stage of the scanner
//! - Probe failure categorization
//! - Per-scan probe statistics
//! - Retry strategy configuration for release metadata APIs
//!
//! Errors fall into three groups:
//! - **Configuration**: a missing or invalid candidate database, fatal before any network I/O
//! - **Probe failures**: a single unreachable file, recovered locally as a negative signal
//! - **Runtime failures**: anything unexpected, reported through callbacks when present

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, categorize_status, get_retry_strategy};
pub use stats::ProbeStats;
pub use types::{
    CandidateDatabaseError, InitializationError, ProbeFailure, ReleaseError, ScanError,
    SelectorError, SignatureError,
};
