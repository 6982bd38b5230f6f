//! Logger setup for the binary.
//!
//! Two line formats are available: colored text for an operator watching a
//! scan, and one JSON object per line for log shippers.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{LevelFilter, Record};

/// Installs the global logger.
///
/// Filters from `RUST_LOG` are read first; `level` then applies to everything
/// and to this crate in particular, so `--log-level` always wins. HTTP stack
/// crates stay at `info` because their `debug` output drowns out the probe log
/// of a scan.
///
/// Typical use:
///
/// ```bash
/// cms_version_scanner --log-level debug scan --url https://example.org
/// RUST_LOG=cms_version_scanner::engine=trace cms_version_scanner scan --url https://example.org
/// cms_version_scanner --log-format json update-database --releases-dir ./releases
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` when a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for noisy in ["reqwest", "hyper", "hyper_util"] {
        builder.filter_module(noisy, LevelFilter::Info);
    }
    builder.filter_module("cms_version_scanner", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(buf, "{}", json_line(record, chrono::Utc::now().timestamp_millis()))
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| writeln!(buf, "{}", plain_line(record)));
        }
    }

    // try_init: tests and embedding callers may already own the global logger
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// `{"ts":..,"level":..,"target":..,"msg":..}` with the message JSON-escaped.
fn json_line(record: &Record, timestamp_ms: i64) -> String {
    let message =
        serde_json::to_string(&record.args().to_string()).unwrap_or_else(|_| "\"\"".into());
    format!(
        "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
        timestamp_ms,
        record.level(),
        record.target(),
        message
    )
}

fn plain_line(record: &Record) -> String {
    let level = record.level();
    let colored_level = match level {
        log::Level::Error => level.to_string().red(),
        log::Level::Warn => level.to_string().yellow(),
        log::Level::Info => level.to_string().green(),
        log::Level::Debug => level.to_string().blue(),
        log::Level::Trace => level.to_string().purple(),
    };

    format!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
        record.target().cyan(),
        colored_level,
        record.args()
    )
}
