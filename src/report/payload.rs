//! Report payload delivered to callback URLs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{REPORT_NAME, REPORT_TEST_NAME, SCANNER_VERSION};
use crate::engine::ScanResult;
use crate::report::classifier::{classify, Classification, ScoreType};

/// Translation key of the error-shaped report.
pub const INTERNAL_ERROR_ID: &str = "INTERNAL_ERROR_OCCURED";
/// Placeholder carrying the error message in the error-shaped report.
pub const EXCEPTION_MESSAGE_PLACEHOLDER: &str = "EXCEPTION_MESSAGE";

/// A translatable message: key plus the values to substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDetail {
    pub translation_string_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub placeholders: BTreeMap<String, String>,
}

impl From<Classification> for TestDetail {
    fn from(c: Classification) -> Self {
        Self {
            translation_string_id: c.verdict.translation_id().to_string(),
            placeholders: c.placeholders,
        }
    }
}

/// The single test carried by a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub name: String,
    pub error_message: Option<TestDetail>,
    pub has_error: bool,
    pub score: u8,
    pub score_type: ScoreType,
    pub test_details: Vec<TestDetail>,
}

/// Report envelope as understood by the scanner's consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub name: String,
    pub version: String,
    pub has_error: bool,
    pub error_message: Option<TestDetail>,
    pub score: u8,
    pub tests: Vec<TestReport>,
}

impl Report {
    /// Builds the success-shaped report for a finished scan.
    pub fn from_result(result: &ScanResult) -> Self {
        let classification = classify(result);
        let verdict = classification.verdict;
        let score = verdict.score();

        Self {
            name: REPORT_NAME.to_string(),
            version: SCANNER_VERSION.to_string(),
            has_error: false,
            error_message: None,
            score,
            tests: vec![TestReport {
                name: REPORT_TEST_NAME.to_string(),
                error_message: None,
                has_error: false,
                score,
                score_type: verdict.score_type(),
                test_details: vec![classification.into()],
            }],
        }
    }

    /// Builds the error-shaped report sent when a scan fails.
    pub fn from_error(message: impl Into<String>) -> Self {
        let detail = TestDetail {
            translation_string_id: INTERNAL_ERROR_ID.to_string(),
            placeholders: BTreeMap::from([(
                EXCEPTION_MESSAGE_PLACEHOLDER.to_string(),
                message.into(),
            )]),
        };

        Self {
            name: REPORT_NAME.to_string(),
            version: SCANNER_VERSION.to_string(),
            has_error: true,
            error_message: Some(detail.clone()),
            score: 0,
            tests: vec![TestReport {
                name: REPORT_TEST_NAME.to_string(),
                error_message: Some(detail),
                has_error: true,
                score: 0,
                score_type: ScoreType::Info,
                test_details: Vec::new(),
            }],
        }
    }
}
