//! Command-line options.
//!
//! The binary parses these with `clap` and converts them into the library
//! configuration types, so the library itself stays usable without a CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_CANDIDATES_PATH, DEFAULT_SIGNATURES_PATH, DEFAULT_USER_AGENT, FAMILY_MIN_HITS,
    FAMILY_PROBE_LIMIT, IDENTIFIER_LIMIT,
};
use crate::config::types::{delay_for_danger_level, LogFormat, LogLevel, ScanConfig, UpdateConfig};

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "cms_version_scanner",
    version,
    about = "Detects the CMS and CMS release of a website and whether it is still supported"
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fingerprint a website
    Scan(ScanArgs),
    /// Ingest extracted release trees and rebuild the candidate database
    UpdateDatabase(UpdateArgs),
    /// Rebuild the candidate database from the signature database only
    BuildCandidates(BuildCandidatesArgs),
    /// Print the upstream release branches of one CMS family
    Releases(ReleasesArgs),
}

/// Options of the `scan` subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Website to scan
    #[arg(long)]
    pub url: String,

    /// Pause before every probe, in milliseconds
    #[arg(long, conflicts_with = "danger_level")]
    pub delay_ms: Option<u64>,

    /// Request pacing as a danger level from 0 (careful) to 10 (fast)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub danger_level: Option<u8>,

    /// Callback URL that receives the report (repeatable)
    #[arg(long = "callback")]
    pub callback_urls: Vec<String>,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Candidate database path
    #[arg(long, default_value = DEFAULT_CANDIDATES_PATH)]
    pub candidates: PathBuf,

    /// Identifier files probed per family during family detection
    #[arg(long, default_value_t = FAMILY_PROBE_LIMIT)]
    pub probe_limit: usize,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<&ScanArgs> for ScanConfig {
    fn from(args: &ScanArgs) -> Self {
        let request_delay = match (args.delay_ms, args.danger_level) {
            (Some(ms), _) => Duration::from_millis(ms),
            (None, Some(level)) => delay_for_danger_level(level),
            (None, None) => Duration::ZERO,
        };

        ScanConfig {
            target: args.url.clone(),
            request_delay,
            callback_urls: args.callback_urls.clone(),
            user_agent: args.user_agent.clone(),
            candidates_path: args.candidates.clone(),
            probe_limit: args.probe_limit,
            min_family_hits: FAMILY_MIN_HITS,
        }
    }
}

/// Options of the `update-database` subcommand.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Directory holding extracted release trees as <Family>/<version>/
    #[arg(long)]
    pub releases_dir: PathBuf,

    /// Signature database path
    #[arg(long, default_value = DEFAULT_SIGNATURES_PATH)]
    pub signatures: PathBuf,

    /// Candidate database output path
    #[arg(long, default_value = DEFAULT_CANDIDATES_PATH)]
    pub candidates: PathBuf,
}

impl From<&UpdateArgs> for UpdateConfig {
    fn from(args: &UpdateArgs) -> Self {
        UpdateConfig {
            releases_dir: args.releases_dir.clone(),
            signatures_path: args.signatures.clone(),
            candidates_path: args.candidates.clone(),
            identifier_limit: IDENTIFIER_LIMIT,
        }
    }
}

/// Options of the `build-candidates` subcommand.
#[derive(Debug, Args)]
pub struct BuildCandidatesArgs {
    /// Signature database path
    #[arg(long, default_value = DEFAULT_SIGNATURES_PATH)]
    pub signatures: PathBuf,

    /// Candidate database output path
    #[arg(long, default_value = DEFAULT_CANDIDATES_PATH)]
    pub candidates: PathBuf,
}

/// Options of the `releases` subcommand.
#[derive(Debug, Args)]
pub struct ReleasesArgs {
    /// CMS family name (Wordpress, Drupal, Joomla, Typo3)
    pub family: String,
}
