//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, probe limits, thresholds)
//! - Library configuration types for scans and database updates
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{BuildCandidatesArgs, Cli, Command, ReleasesArgs, ScanArgs, UpdateArgs};
pub use constants::*;
pub use types::{delay_for_danger_level, LogFormat, LogLevel, ScanConfig, UpdateConfig};
