//! Scan orchestration.
//!
//! `run_scan` drives one website scan from configuration to report:
//! 1. Normalize the target URL
//! 2. Load and validate the candidate database (before any network I/O)
//! 3. Detect family and version, classify support
//! 4. Deliver the report to every callback URL
//!
//! Failures after target normalization are reported to the callbacks as an
//! error-shaped report when callbacks are configured, and returned to the
//! caller otherwise.

mod callback;
mod target;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::candidates::load_candidates;
use crate::config::ScanConfig;
use crate::engine::{FingerprintEngine, HttpFetcher, ProbeFetcher, ScanContext, ScanResult};
use crate::error_handling::{InitializationError, ScanError};
use crate::initialization::{init_api_client, init_callback_client, init_probe_client};
use crate::releases::ReleaseRegistry;
use crate::report::Report;

pub use callback::deliver_report;
pub use target::normalize_target;

/// Scans one website using the upstream release metadata providers.
///
/// # Errors
///
/// Returns `ScanError` when the target is invalid, or when the scan fails
/// and no callback URL is configured.
pub async fn run_scan(config: &ScanConfig) -> Result<ScanResult, ScanError> {
    let client = init_api_client().map_err(InitializationError::from)?;
    run_scan_with(config, &ReleaseRegistry::with_defaults(client)).await
}

/// Like `run_scan`, with an explicit release metadata registry.
///
/// # Errors
///
/// See `run_scan`.
pub async fn run_scan_with(
    config: &ScanConfig,
    releases: &ReleaseRegistry,
) -> Result<ScanResult, ScanError> {
    let target = normalize_target(&config.target)?;
    log::info!("Scanning {}", target);

    let outcome = scan_target(config, &target, releases).await;

    if config.callback_urls.is_empty() {
        return outcome;
    }

    let callback_client = init_callback_client().map_err(InitializationError::from)?;
    match outcome {
        Ok(result) => {
            let report = Report::from_result(&result);
            deliver_report(&callback_client, &config.callback_urls, &report).await;
            log::info!("Finished callbacks for {}", target);
            Ok(result)
        }
        Err(e) => {
            log::error!("Scan of {} failed: {}", target, e);
            let report = Report::from_error(e.to_string());
            deliver_report(&callback_client, &config.callback_urls, &report).await;
            Ok(ScanResult::default())
        }
    }
}

async fn scan_target(
    config: &ScanConfig,
    target: &str,
    releases: &ReleaseRegistry,
) -> Result<ScanResult, ScanError> {
    let candidates = load_candidates(&config.candidates_path).await?;

    let probe_client = init_probe_client(&config.user_agent).map_err(InitializationError::from)?;
    let fetcher: Arc<dyn ProbeFetcher> = Arc::new(HttpFetcher::new(probe_client));
    let ctx = ScanContext::new(target, config.request_delay);

    let engine = FingerprintEngine::new(ctx, fetcher, Arc::new(candidates))
        .with_family_thresholds(config.probe_limit, config.min_family_hits);

    guarded_scan(&engine, releases).await
}

/// Runs the engine; a panic anywhere in detection or classification becomes
/// `ScanError::Runtime` instead of tearing down the caller.
async fn guarded_scan(
    engine: &FingerprintEngine,
    releases: &ReleaseRegistry,
) -> Result<ScanResult, ScanError> {
    AssertUnwindSafe(engine.scan(releases))
        .catch_unwind()
        .await
        .map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            ScanError::Runtime(anyhow::anyhow!("scan aborted: {}", message))
        })
}
