//! Integration tests for run_scan
//!
//! These tests drive a complete scan against an httptest site:
//! - Family detection and version narrowing over real HTTP
//! - Support classification through an injected release provider
//! - Report delivery to callback URLs
//! - The catch-all server guard
//! - Unexpected failures inside a scan

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use cms_version_scanner::error_handling::ReleaseError;
use cms_version_scanner::releases::{
    ReleaseBranch, ReleaseMetadataProvider, ReleasePackages, WordpressReleases,
};
use cms_version_scanner::signature::content_hash;
use cms_version_scanner::{run_scan_with, ReleaseRegistry, ScanConfig, ScanError};
use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use tempfile::TempDir;

const WP_FILES: &[(&str, &str)] = &[
    ("/wp-includes/js/a.js", "a-6.3"),
    ("/wp-includes/js/b.js", "b-6.3.2"),
    ("/wp-includes/js/c.js", "shared"),
    ("/wp-includes/js/d.js", "shared"),
];

/// Writes a candidate database with four WordPress and four Drupal identifiers.
fn write_candidates(dir: &TempDir) -> PathBuf {
    let all = json!(["6.3.1", "6.3.2", "6.4.2"]);
    let wordpress = json!({
        "identifier": [
            {"path": "wp-includes/js/a.js", "score": 1.6,
             "hashTable": {content_hash(b"a-6.3"): ["6.3.1", "6.3.2"], content_hash(b"a-6.4"): ["6.4.2"]}},
            {"path": "wp-includes/js/b.js", "score": 1.6,
             "hashTable": {content_hash(b"b-6.3.1"): ["6.3.1"], content_hash(b"b-6.3.2"): ["6.3.2", "6.4.2"]}},
            {"path": "wp-includes/js/c.js", "score": 1.3, "hashTable": {content_hash(b"shared"): all}},
            {"path": "wp-includes/js/d.js", "score": 1.3, "hashTable": {content_hash(b"shared"): all}}
        ],
        "versionproof": {"6.3.1": false, "6.3.2": false, "6.4.2": {"wp-includes/js/a.js": content_hash(b"a-6.4")}}
    });
    let drupal_identifiers: Vec<_> = ["misc/drupal.js", "misc/jquery.js", "misc/tabledrag.js", "misc/ajax.js"]
        .iter()
        .map(|path| json!({"path": path, "score": 1.0, "hashTable": {content_hash(b"d"): ["7.50"]}}))
        .collect();
    let database = json!({
        "Drupal": {"identifier": drupal_identifiers, "versionproof": {"7.50": false}},
        "Wordpress": wordpress,
    });

    let path = dir.path().join("candidates.json");
    std::fs::write(&path, database.to_string()).expect("write candidates");
    path
}

/// Site serving the WordPress files; every other path is missing.
fn wordpress_site() -> Server {
    let server = Server::run();
    for (path, content) in WP_FILES {
        server.expect(
            Expectation::matching(request::method_path("GET", *path))
                .times(1..)
                .respond_with(status_code(200).body(*content)),
        );
    }
    server.expect(
        Expectation::matching(all_of![
            request::method("GET"),
            request::path(not(matches("^/wp-"))),
        ])
        .times(..)
        .respond_with(status_code(404)),
    );
    server
}

fn release_api() -> Server {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/core/version-check/1.7/"))
            .times(..)
            .respond_with(status_code(200).body(
                r#"{"offers": [{"version": "6.4.2"}, {"version": "6.3.2"}]}"#,
            )),
    );
    server
}

fn registry(api: &Server) -> ReleaseRegistry {
    let mut registry = ReleaseRegistry::new();
    registry.register(Box::new(WordpressReleases::with_urls(
        reqwest::Client::new(),
        api.url("/core/version-check/1.7/").to_string(),
        api.url("/download/releases/").to_string(),
    )));
    registry
}

/// Provider whose branch lookup blows up mid-scan.
struct PanickingReleases;

#[async_trait]
impl ReleaseMetadataProvider for PanickingReleases {
    fn family(&self) -> &'static str {
        "Wordpress"
    }

    async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError> {
        panic!("release index corrupted")
    }

    async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError> {
        Ok(ReleasePackages::new())
    }
}

fn panicking_registry() -> ReleaseRegistry {
    let mut registry = ReleaseRegistry::new();
    registry.register(Box::new(PanickingReleases));
    registry
}

#[tokio::test]
async fn test_scan_detects_current_wordpress_release() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let site = wordpress_site();
    let api = release_api();

    let config = ScanConfig {
        target: site.url("/").to_string(),
        candidates_path: write_candidates(&dir),
        request_delay: Duration::from_millis(1),
        ..Default::default()
    };

    let result = run_scan_with(&config, &registry(&api))
        .await
        .expect("scan succeeds");

    assert_eq!(result.cms.as_deref(), Some("Wordpress"));
    let versions: Vec<&str> = result.versions.keys().map(String::as_str).collect();
    assert_eq!(versions, vec!["6.3.2"]);
    let details = &result.versions["6.3.2"];
    assert_eq!(details.supported, Some(true));
    assert_eq!(details.is_latest, Some(true));
    assert_eq!(details.latest_in_branch.as_deref(), Some("6.3.2"));
}

#[tokio::test]
async fn test_scan_delivers_report_to_callback() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let site = wordpress_site();
    let api = release_api();
    let callback = Server::run();
    callback.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/report"),
            request::body(matches("CMS_UPTODATE")),
        ])
        .times(1)
        .respond_with(status_code(200)),
    );

    let config = ScanConfig {
        target: site.url("/").to_string(),
        candidates_path: write_candidates(&dir),
        callback_urls: vec![callback.url("/report").to_string()],
        ..Default::default()
    };

    let result = run_scan_with(&config, &registry(&api))
        .await
        .expect("scan succeeds");
    assert_eq!(result.cms.as_deref(), Some("Wordpress"));
}

#[tokio::test]
async fn test_catch_all_server_is_not_fingerprinted() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let site = Server::run();
    site.expect(
        Expectation::matching(request::method("GET"))
            .times(..)
            .respond_with(status_code(200).body("<html>Welcome</html>")),
    );

    let config = ScanConfig {
        target: site.url("/").to_string(),
        candidates_path: write_candidates(&dir),
        probe_limit: 4,
        ..Default::default()
    };

    let result = run_scan_with(&config, &ReleaseRegistry::new())
        .await
        .expect("scan succeeds");
    assert!(result.cms.is_none());
    assert!(result.versions.is_empty());
}

#[tokio::test]
async fn test_invalid_database_fails_before_probing() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("candidates.json");
    std::fs::write(&path, "{}").expect("write candidates");

    // no expectations: any request to the site would fail the test on drop
    let site = Server::run();
    let config = ScanConfig {
        target: site.url("/").to_string(),
        candidates_path: path,
        ..Default::default()
    };

    let err = run_scan_with(&config, &ReleaseRegistry::new())
        .await
        .expect_err("empty database is a configuration error");
    assert!(matches!(err, ScanError::Configuration(_)));
}

#[tokio::test]
async fn test_panic_during_scan_is_a_runtime_failure() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let site = wordpress_site();
    let config = ScanConfig {
        target: site.url("/").to_string(),
        candidates_path: write_candidates(&dir),
        ..Default::default()
    };

    let err = run_scan_with(&config, &panicking_registry())
        .await
        .expect_err("panic surfaces as an error without callbacks");
    assert!(matches!(err, ScanError::Runtime(_)));
    assert!(err.to_string().contains("release index corrupted"));
}

#[tokio::test]
async fn test_panic_during_scan_is_reported_to_callbacks() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let site = wordpress_site();
    let callback = Server::run();
    callback.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/report"),
            request::body(matches("INTERNAL_ERROR_OCCURED")),
            request::body(matches("release index corrupted")),
        ])
        .times(1)
        .respond_with(status_code(200)),
    );

    let config = ScanConfig {
        target: site.url("/").to_string(),
        candidates_path: write_candidates(&dir),
        callback_urls: vec![callback.url("/report").to_string()],
        ..Default::default()
    };

    let result = run_scan_with(&config, &panicking_registry())
        .await
        .expect("failures go to callbacks");
    assert!(result.cms.is_none());
}
