//! Report delivery to callback URLs.

use std::sync::Arc;

use futures::future::join_all;

use crate::report::Report;

/// Posts the report to every callback URL concurrently.
///
/// Each URL gets its own task; one slow or failing receiver never delays
/// or fails the others. Failures are logged and otherwise ignored.
///
/// Returns the number of receivers that acknowledged with a success status.
pub async fn deliver_report(client: &reqwest::Client, urls: &[String], report: &Report) -> usize {
    let report = Arc::new(report.clone());

    let handles = urls.iter().map(|url| {
        let client = client.clone();
        let report = Arc::clone(&report);
        let url = url.clone();
        tokio::spawn(async move { post_report(&client, &url, &report).await })
    });

    join_all(handles)
        .await
        .into_iter()
        .filter(|outcome| matches!(outcome, Ok(true)))
        .count()
}

async fn post_report(client: &reqwest::Client, url: &str, report: &Report) -> bool {
    log::info!("Sending report to callback {}", url);
    match client.post(url).json(report).send().await {
        Ok(response) if response.status().is_success() => {
            log::debug!("Callback {} answered {}", url, response.status());
            true
        }
        Ok(response) => {
            log::warn!(
                "Callback {} rejected the report with status {}",
                url,
                response.status()
            );
            false
        }
        Err(e) => {
            log::warn!("Could not send the report to callback {}: {}", url, e);
            false
        }
    }
}
