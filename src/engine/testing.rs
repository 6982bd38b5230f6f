//! In-memory fetcher for engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::engine::context::ProbeFetcher;
use crate::error_handling::ProbeFailure;

/// Serves a fixed set of URLs and records every request.
pub struct StaticFetcher {
    files: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
    catch_all: bool,
}

impl StaticFetcher {
    pub fn new<U: AsRef<str>, B: AsRef<[u8]>>(files: &[(U, B)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(url, body)| (url.as_ref().to_string(), body.as_ref().to_vec()))
                .collect(),
            requests: Mutex::new(Vec::new()),
            catch_all: false,
        }
    }

    /// A site that serves nothing.
    pub fn empty() -> Self {
        Self::new::<&str, &str>(&[])
    }

    /// A misconfigured server answering every path with a welcome page.
    pub fn catch_all() -> Self {
        Self {
            catch_all: true,
            ..Self::empty()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProbeFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeFailure> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        match self.files.get(url) {
            Some(body) => Ok(body.clone()),
            None if self.catch_all => Ok(b"<html>Welcome</html>".to_vec()),
            None => Err(ProbeFailure::NotFound),
        }
    }
}
