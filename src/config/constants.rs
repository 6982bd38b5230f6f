//! Configuration constants.
//!
//! This module defines the constants used throughout the scanner, including
//! network timeouts, probe limits, detection thresholds and default paths.

use std::time::Duration;

// Network operation timeouts
/// Timeout for a single probe request against the target site.
/// A probe that does not answer in time is treated as a missing file.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for delivering a report to one callback URL.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for upstream release metadata APIs.
pub const RELEASE_API_TIMEOUT: Duration = Duration::from_secs(30);
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent string for probe and callback requests.
///
/// Users can override this via the `--user-agent` CLI flag or the
/// `user_agent` field of `ScanConfig`.
pub const DEFAULT_USER_AGENT: &str = "SIWECOS Version Scanner";

// Family detection
/// Number of identifier files probed per family during family detection.
///
/// This is also the maximum hit count a family can reach. Two or more
/// families reaching it means the server answers every path with success.
pub const FAMILY_PROBE_LIMIT: usize = 20;
/// Minimum number of probe hits required before a family is claimed.
pub const FAMILY_MIN_HITS: usize = 4;

// Candidate database
/// Number of identifier candidates stored per family in the candidate file.
pub const IDENTIFIER_LIMIT: usize = 100;
/// Default location of the candidate database consumed by scans.
pub const DEFAULT_CANDIDATES_PATH: &str = "./storage/signatures/candidates.json";
/// Default location of the accumulated signature database.
pub const DEFAULT_SIGNATURES_PATH: &str = "./storage/signatures.json";

// Request pacing
/// Highest accepted danger level. Higher levels mean shorter pauses between probes.
pub const MAX_DANGER_LEVEL: u8 = 10;
/// Milliseconds added per danger level step below the maximum.
pub const DELAY_PER_DANGER_STEP_MS: u64 = 20;
/// Minimum pause between two probes, used at the maximum danger level.
pub const MIN_REQUEST_DELAY_MS: u64 = 10;

// Retry strategy (release metadata APIs only; probes are never retried)
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retry attempts
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// Report payload
/// Scanner name carried in every report payload.
pub const REPORT_NAME: &str = "VERSION";
/// Name of the single test carried in every report payload.
pub const REPORT_TEST_NAME: &str = "CMSVERSION";
/// Scanner version carried in every report payload.
pub const SCANNER_VERSION: &str = env!("CARGO_PKG_VERSION");
