//! cms_version_scanner library: remote CMS fingerprinting
//!
//! This library detects which content-management system a website runs,
//! which release of it, and whether that release is current and still
//! supported upstream. Detection works purely from static files: the
//! scanner requests files whose content is known for every release and
//! compares content hashes against a prebuilt candidate database.
//!
//! # Example
//!
//! ```no_run
//! use cms_version_scanner::{run_scan, ScanConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig {
//!     target: "https://example.org".to_string(),
//!     ..Default::default()
//! };
//!
//! let result = run_scan(&config).await?;
//! match result.cms {
//!     Some(cms) => println!("{} {:?}", cms, result.versions.keys().collect::<Vec<_>>()),
//!     None => println!("No CMS detected"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod candidates;
pub mod config;
pub mod engine;
pub mod error_handling;
pub mod initialization;
pub mod releases;
pub mod report;
pub mod scan;
pub mod signature;
pub mod update;
pub mod version;

// Re-export public API
pub use config::{LogFormat, LogLevel, ScanConfig, UpdateConfig};
pub use engine::{FingerprintEngine, ScanResult, VersionDetails};
pub use error_handling::ScanError;
pub use releases::{ReleaseBranch, ReleaseMetadataProvider, ReleaseRegistry};
pub use report::{classify, Report, Verdict};
pub use scan::{run_scan, run_scan_with};
pub use update::{rebuild_candidates, update_database, UpdateSummary};
