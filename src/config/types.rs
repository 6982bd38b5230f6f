//! Configuration types.
//!
//! This module defines the enums and structs used to configure scans and the
//! offline database update, independent of the command-line surface.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_CANDIDATES_PATH, DEFAULT_SIGNATURES_PATH, DEFAULT_USER_AGENT,
    DELAY_PER_DANGER_STEP_MS, FAMILY_MIN_HITS, FAMILY_PROBE_LIMIT, IDENTIFIER_LIMIT,
    MAX_DANGER_LEVEL, MIN_REQUEST_DELAY_MS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Converts a danger level into the pause taken before every probe.
///
/// Level 10 is the most aggressive setting (10 ms between probes), level 0 the
/// most careful one (210 ms). Levels above 10 are clamped.
pub fn delay_for_danger_level(level: u8) -> Duration {
    let steps = u64::from(MAX_DANGER_LEVEL - level.min(MAX_DANGER_LEVEL));
    Duration::from_millis(steps * DELAY_PER_DANGER_STEP_MS + MIN_REQUEST_DELAY_MS)
}

/// Configuration for a single website scan.
///
/// # Examples
///
/// ```no_run
/// use cms_version_scanner::ScanConfig;
/// use std::time::Duration;
///
/// let config = ScanConfig {
///     target: "https://example.org".to_string(),
///     request_delay: Duration::from_millis(50),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Base URL of the website to fingerprint
    pub target: String,

    /// Pause taken before every probe request
    pub request_delay: Duration,

    /// URLs that receive the report once the scan finishes
    pub callback_urls: Vec<String>,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Path to the candidate database (JSON)
    pub candidates_path: PathBuf,

    /// Identifier files probed per family during family detection
    pub probe_limit: usize,

    /// Minimum probe hits required to claim a family
    pub min_family_hits: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            request_delay: Duration::ZERO,
            callback_urls: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            candidates_path: PathBuf::from(DEFAULT_CANDIDATES_PATH),
            probe_limit: FAMILY_PROBE_LIMIT,
            min_family_hits: FAMILY_MIN_HITS,
        }
    }
}

/// Configuration for the offline signature and candidate database update.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Directory holding extracted release trees as `<Family>/<version>/`
    pub releases_dir: PathBuf,

    /// Path to the accumulated signature database (JSON)
    pub signatures_path: PathBuf,

    /// Path the candidate database is written to (JSON)
    pub candidates_path: PathBuf,

    /// Identifier candidates kept per family
    pub identifier_limit: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            releases_dir: PathBuf::from("./storage/releases"),
            signatures_path: PathBuf::from(DEFAULT_SIGNATURES_PATH),
            candidates_path: PathBuf::from(DEFAULT_CANDIDATES_PATH),
            identifier_limit: IDENTIFIER_LIMIT,
        }
    }
}
