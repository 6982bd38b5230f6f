//! Error type definitions.
//!
//! This module defines the error taxonomy used throughout the scanner:
//! fatal configuration errors, recoverable probe failures, offline pipeline
//! errors and the top-level scan error.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors loading or validating the candidate database.
///
/// Any of these aborts a scan before the first network request.
#[derive(Error, Debug)]
pub enum CandidateDatabaseError {
    /// The candidate file does not exist.
    #[error("Could not find candidate database at {}", .0.display())]
    NotFound(PathBuf),

    /// The candidate file exists but could not be read or written.
    #[error("Could not access candidate database at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The candidate file is not valid candidate JSON.
    #[error("Invalid candidate database: {0}")]
    Parse(#[from] serde_json::Error),

    /// The candidate file holds no CMS family at all.
    #[error("Invalid candidate database: no CMS families")]
    Empty,

    /// A family is present but has no identifier files to probe.
    #[error("Invalid candidate database: family {0} has no identifier files")]
    EmptyIdentifiers(String),
}

/// Errors raised by the candidate selector.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector was given no signatures or no versions.
    #[error("Invalid selector input: {0}")]
    InvalidInput(&'static str),
}

/// Errors raised while extracting or persisting signatures.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// The release tree (or its web root) does not exist.
    #[error("Invalid release base path: {}", .0.display())]
    InvalidBasePath(PathBuf),

    /// Walking the release tree failed.
    #[error("Release tree walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Reading or writing a file failed.
    #[error("Signature I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An inclusion policy pattern does not compile.
    #[error("Invalid inclusion pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The signature database file is not valid JSON.
    #[error("Invalid signature database: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by release metadata providers.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The upstream API could not be reached.
    #[error("Release API request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The upstream API answered with a non-success status.
    #[error("Release API {url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// The upstream payload did not have the expected shape.
    #[error("Could not parse release metadata: {0}")]
    Parse(String),

    /// No provider is registered for the family.
    #[error("No release metadata provider for CMS family {0}")]
    UnknownFamily(String),

    /// A release lists no package file the scanner knows how to use.
    #[error("Could not find package name for release {0}")]
    MissingPackageName(String),
}

impl From<serde_json::Error> for ReleaseError {
    fn from(e: serde_json::Error) -> Self {
        ReleaseError::Parse(e.to_string())
    }
}

/// Top-level scan error.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The candidate database is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] CandidateDatabaseError),

    /// The target URL cannot be scanned.
    #[error("Invalid target URL: {0}")]
    InvalidTarget(String),

    /// Shared resources could not be initialized.
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    /// Unexpected failure while detecting or classifying.
    #[error("Runtime failure: {0:#}")]
    Runtime(#[from] anyhow::Error),
}

/// Categories of failed probe requests.
///
/// A probe failure is never fatal: the engine treats every variant as
/// "file absent" and moves on. The categories only feed statistics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ProbeFailure {
    Timeout,
    Connect,
    NotFound,   // 404
    Forbidden,  // 401, 403
    ClientStatus,
    ServerStatus,
    Redirect,
    Body,
    Request,
    Other,
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ProbeFailure {}

impl ProbeFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeFailure::Timeout => "probe timeout",
            ProbeFailure::Connect => "probe connect error",
            ProbeFailure::NotFound => "Not Found (404)",
            ProbeFailure::Forbidden => "Forbidden (401/403)",
            ProbeFailure::ClientStatus => "other client error status",
            ProbeFailure::ServerStatus => "server error status",
            ProbeFailure::Redirect => "redirect error",
            ProbeFailure::Body => "response body error",
            ProbeFailure::Request => "request error",
            ProbeFailure::Other => "other probe error",
        }
    }
}
