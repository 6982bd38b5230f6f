//! Result classification and report payloads.
//!
//! A finished scan is reduced to one `Verdict` with a translation key and
//! placeholders, then wrapped into the report envelope sent to callbacks.
//! Failed scans produce an error-shaped envelope instead.

mod classifier;
mod payload;

pub use classifier::{classify, Classification, ScoreType, Verdict};
pub use payload::{
    Report, TestDetail, TestReport, EXCEPTION_MESSAGE_PLACEHOLDER, INTERNAL_ERROR_ID,
};
