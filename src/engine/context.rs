//! Scan context and probe fetching.
//!
//! A `ScanContext` carries everything one scan needs besides the candidate
//! database: the normalized site base, the pause taken before each request,
//! per-scan probe statistics and an observer for progress events. It is
//! passed explicitly through every engine call, so two scans never share
//! mutable state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::{categorize_reqwest_error, categorize_status, ProbeFailure, ProbeStats};
use crate::signature::content_hash;

/// Fetches one file from the scanned site.
///
/// Any failure (timeout, connection error, non-success status) means the
/// file is treated as absent; the category only feeds statistics and logs.
#[async_trait]
pub trait ProbeFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeFailure>;
}

/// `ProbeFetcher` over a `reqwest::Client`.
///
/// Timeouts, TLS and redirect behavior come from the client; build it with
/// `initialization::init_probe_client`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProbeFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(categorize_status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| categorize_reqwest_error(&e))?;
        Ok(body.to_vec())
    }
}

/// Receives progress events of a scan.
///
/// Every method has a no-op default, so observers only implement what they need.
pub trait ScanObserver: Send + Sync {
    fn probe_succeeded(&self, _url: &str) {}

    fn probe_failed(&self, _url: &str, _failure: ProbeFailure) {}

    fn family_scored(&self, _family: &str, _hits: usize) {}

    fn family_detected(&self, _family: Option<&str>) {}

    fn candidates_narrowed(&self, _path: &str, _remaining: &[String]) {}
}

/// Observer that reports progress through the `log` facade.
pub struct LogObserver;

impl ScanObserver for LogObserver {
    fn probe_succeeded(&self, url: &str) {
        log::debug!("File found: {}", url);
    }

    fn probe_failed(&self, url: &str, failure: ProbeFailure) {
        log::debug!("File not found: {} ({})", url, failure);
    }

    fn family_scored(&self, family: &str, hits: usize) {
        log::info!("{} matched {} identifier files", family, hits);
    }

    fn family_detected(&self, family: Option<&str>) {
        match family {
            Some(family) => log::info!("Detected CMS {}", family),
            None => log::info!("No CMS detected"),
        }
    }

    fn candidates_narrowed(&self, path: &str, remaining: &[String]) {
        log::debug!("{} versions remaining after {}", remaining.len(), path);
    }
}

/// State of one scan.
pub struct ScanContext {
    base_url: String,
    request_delay: Duration,
    stats: Arc<ProbeStats>,
    observer: Arc<dyn ScanObserver>,
}

impl ScanContext {
    /// Creates a context for a site base URL.
    ///
    /// The base is stored with exactly one trailing slash, so probe paths
    /// (with or without a leading slash) are appended directly.
    pub fn new(base_url: &str, request_delay: Duration) -> Self {
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            request_delay,
            stats: Arc::new(ProbeStats::new()),
            observer: Arc::new(LogObserver),
        }
    }

    /// Replaces the default logging observer.
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    pub fn stats(&self) -> &ProbeStats {
        &self.stats
    }

    pub fn observer(&self) -> &dyn ScanObserver {
        self.observer.as_ref()
    }

    /// Absolute URL of a root-relative file path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetches one file after the configured pause.
    ///
    /// Returns `None` for any failure; failures are counted and reported to
    /// the observer but never propagated.
    pub async fn probe(&self, fetcher: &dyn ProbeFetcher, path: &str) -> Option<Vec<u8>> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let url = self.url_for(path);
        match fetcher.fetch(&url).await {
            Ok(body) => {
                self.stats.record_hit();
                self.observer.probe_succeeded(&url);
                Some(body)
            }
            Err(failure) => {
                self.stats.record_failure(failure);
                self.observer.probe_failed(&url, failure);
                None
            }
        }
    }

    /// Fetches one file and returns its content hash.
    pub async fn probe_hash(&self, fetcher: &dyn ProbeFetcher, path: &str) -> Option<String> {
        self.probe(fetcher, path).await.map(|body| content_hash(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::StaticFetcher;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let ctx = ScanContext::new("https://example.org//", Duration::ZERO);
        assert_eq!(ctx.base_url(), "https://example.org/");
        assert_eq!(ctx.url_for("/misc/drupal.js"), "https://example.org/misc/drupal.js");
        assert_eq!(ctx.url_for("misc/drupal.js"), "https://example.org/misc/drupal.js");
    }

    #[tokio::test]
    async fn test_probe_records_stats() {
        let fetcher = StaticFetcher::new(&[("https://example.org/a.js", "a")]);
        let ctx = ScanContext::new("https://example.org", Duration::ZERO);

        assert_eq!(ctx.probe(&fetcher, "a.js").await, Some(b"a".to_vec()));
        assert_eq!(ctx.probe(&fetcher, "b.js").await, None);

        assert_eq!(ctx.stats().hits(), 1);
        assert_eq!(ctx.stats().get_failure_count(ProbeFailure::NotFound), 1);
        assert_eq!(ctx.stats().total_probes(), 2);
    }

    #[tokio::test]
    async fn test_http_fetcher_maps_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/core.js"))
                .respond_with(status_code(200).body("var x;")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/admin.js"))
                .respond_with(status_code(403)),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/broken.js"))
                .respond_with(status_code(500)),
        );

        let fetcher = HttpFetcher::new(reqwest::Client::new());
        let body = fetcher
            .fetch(&server.url("/core.js").to_string())
            .await
            .expect("file exists");
        assert_eq!(body, b"var x;");

        assert_eq!(
            fetcher.fetch(&server.url("/admin.js").to_string()).await,
            Err(ProbeFailure::Forbidden)
        );
        assert_eq!(
            fetcher.fetch(&server.url("/broken.js").to_string()).await,
            Err(ProbeFailure::ServerStatus)
        );
    }
}
