//! HTTP client initialization.
//!
//! The scanner talks to three kinds of servers, each with its own client:
//! - the scanned site (short timeout, certificate errors tolerated)
//! - callback receivers (long timeout)
//! - CMS release metadata APIs

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{
    CALLBACK_TIMEOUT, DEFAULT_USER_AGENT, PROBE_TIMEOUT, RELEASE_API_TIMEOUT,
    TCP_CONNECT_TIMEOUT_SECS,
};

/// Initializes the client used to probe the scanned site.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the scan configuration
/// - `PROBE_TIMEOUT` per request
/// - Redirect following enabled (up to 10 hops)
/// - Certificate verification disabled: sites with broken TLS still run a CMS
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(PROBE_TIMEOUT)
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::limited(10))
        .danger_accept_invalid_certs(true)
        .user_agent(user_agent.to_string())
        .build()
}

/// Initializes the client used to deliver reports to callback URLs.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_callback_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(CALLBACK_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}

/// Initializes the client used for release metadata APIs.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_api_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(RELEASE_API_TIMEOUT)
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}
