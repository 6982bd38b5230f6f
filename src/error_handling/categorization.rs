//! Probe failure categorization and retry strategy.
//!
//! This module maps transport errors and HTTP statuses onto `ProbeFailure`
//! and configures the retry strategy used for release metadata APIs.

use std::time::Duration;

use reqwest::StatusCode;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::ProbeFailure;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum attempts: `RETRY_MAX_ATTEMPTS`
///
/// Only release metadata requests are retried. Probes against the target are
/// not: a missing file is a signal, and retries would multiply the load the
/// request delay is meant to bound.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a non-success HTTP status.
pub fn categorize_status(status: StatusCode) -> ProbeFailure {
    match status.as_u16() {
        404 | 410 => ProbeFailure::NotFound,
        401 | 403 => ProbeFailure::Forbidden,
        _ if status.is_redirection() => ProbeFailure::Redirect,
        _ if status.is_client_error() => ProbeFailure::ClientStatus,
        _ if status.is_server_error() => ProbeFailure::ServerStatus,
        _ => ProbeFailure::Other,
    }
}

/// Categorizes a `reqwest::Error` into a `ProbeFailure`.
///
/// HTTP status codes are checked first, then the reqwest error kind.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ProbeFailure {
    if let Some(status) = error.status() {
        return categorize_status(status);
    }

    if error.is_timeout() {
        ProbeFailure::Timeout
    } else if error.is_connect() {
        ProbeFailure::Connect
    } else if error.is_redirect() {
        ProbeFailure::Redirect
    } else if error.is_body() || error.is_decode() {
        ProbeFailure::Body
    } else if error.is_request() {
        ProbeFailure::Request
    } else {
        ProbeFailure::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[test]
    fn test_get_retry_strategy_initial_delay() {
        let first_delay = get_retry_strategy()
            .next()
            .expect("strategy yields at least one delay");
        let expected_ms = crate::config::RETRY_INITIAL_DELAY_MS as u128;
        assert!(
            first_delay.as_millis() >= expected_ms,
            "Expected delay >= {}ms, got {}ms",
            expected_ms,
            first_delay.as_millis()
        );
    }

    #[test]
    fn test_get_retry_strategy_attempt_limit() {
        assert_eq!(
            get_retry_strategy().count(),
            crate::config::RETRY_MAX_ATTEMPTS
        );
    }

    #[test]
    fn test_categorize_status_codes() {
        assert_eq!(categorize_status(StatusCode::NOT_FOUND), ProbeFailure::NotFound);
        assert_eq!(categorize_status(StatusCode::GONE), ProbeFailure::NotFound);
        assert_eq!(categorize_status(StatusCode::FORBIDDEN), ProbeFailure::Forbidden);
        assert_eq!(
            categorize_status(StatusCode::UNAUTHORIZED),
            ProbeFailure::Forbidden
        );
        assert_eq!(
            categorize_status(StatusCode::TOO_MANY_REQUESTS),
            ProbeFailure::ClientStatus
        );
        assert_eq!(
            categorize_status(StatusCode::BAD_GATEWAY),
            ProbeFailure::ServerStatus
        );
        assert_eq!(
            categorize_status(StatusCode::MOVED_PERMANENTLY),
            ProbeFailure::Redirect
        );
    }

    #[tokio::test]
    async fn test_categorize_reqwest_status_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/missing.js"))
                .respond_with(status_code(404)),
        );

        let error = reqwest::get(server.url("/missing.js").to_string())
            .await
            .expect("request reaches the mock server")
            .error_for_status()
            .expect_err("404 must become an error");

        assert_eq!(categorize_reqwest_error(&error), ProbeFailure::NotFound);
    }

    #[tokio::test]
    async fn test_categorize_reqwest_connect_error() {
        // Port 9 on localhost is not listening in test environments
        let error = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("nothing listens on the discard port");

        let failure = categorize_reqwest_error(&error);
        assert!(
            matches!(failure, ProbeFailure::Connect | ProbeFailure::Request),
            "unexpected category {:?}",
            failure
        );
    }
}
