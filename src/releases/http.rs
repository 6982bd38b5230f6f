//! Retrying fetch helpers shared by the release providers.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;

use crate::error_handling::{get_retry_strategy, ReleaseError};

/// Transport failures, rate limiting and server errors are worth another attempt.
fn is_transient(error: &ReleaseError) -> bool {
    match error {
        ReleaseError::Http(_) => true,
        ReleaseError::Status { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, ReleaseError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ReleaseError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// Fetches a release metadata document as text, retrying transient failures.
pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, ReleaseError> {
    log::debug!("Fetching release metadata from {}", url);
    RetryIf::spawn(get_retry_strategy(), || fetch_once(client, url), is_transient).await
}

/// Fetches and decodes a JSON release metadata document.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, ReleaseError> {
    let body = fetch_text(client, url).await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[tokio::test]
    async fn test_fetch_text_success() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/json"))
                .respond_with(status_code(200).body("{}")),
        );

        let body = fetch_text(&Client::new(), &server.url("/json").to_string())
            .await
            .expect("fetch succeeds");
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_fetch_text_client_error_is_not_retried() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/json"))
                .times(1)
                .respond_with(status_code(404)),
        );

        let result = fetch_text(&Client::new(), &server.url("/json").to_string()).await;
        assert!(matches!(result, Err(ReleaseError::Status { status: 404, .. })));
    }

    #[test]
    fn test_is_transient() {
        let server_error = ReleaseError::Status {
            url: "u".into(),
            status: 503,
        };
        let not_found = ReleaseError::Status {
            url: "u".into(),
            status: 404,
        };
        assert!(is_transient(&server_error));
        assert!(!is_transient(&not_found));
        assert!(!is_transient(&ReleaseError::Parse("bad".into())));
    }
}
