//! Decoding of the JSON test log and classification of its records.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Result type for decoding a test log.
pub type LogResult<T> = Result<T, LogError>;

/// Marker substring of failed test statuses.
pub const FAIL_MARKER: &str = "FAIL";
/// Marker substring of failures caused by scripts with a different line count.
pub const UNEQUAL_LENGTH_MARKER: &str = "Files have unequal lengths";

const CATEGORY_FALLBACK: &str = "Unknown";

/// Failures while decoding a log document.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("the test log is empty")]
    Empty,
    #[error("invalid test log JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pass/fail outcome derived from the status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl TestOutcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }
}

/// Why a failed test failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FailureKind {
    /// Master and test script differ in line count; no deviation analysis.
    UnequalLengths,
    /// Any other failure, typically a deviation above the threshold.
    Threshold,
}

impl FailureKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnequalLengths => "Files have unequal lengths",
            Self::Threshold => "Fail due to threshold",
        }
    }
}

/// Extra script lines reported for unequal-length failures.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnequalLengthInfo {
    #[serde(default)]
    pub extra_lines_in_file1: Vec<String>,
    #[serde(default)]
    pub extra_lines_in_file2: Vec<String>,
}

/// One executed test case as stored in the log.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub testname: Option<String>,
    #[serde(default)]
    pub startdate: Option<String>,
    #[serde(default)]
    pub test_status: String,
    #[serde(default)]
    pub master_script: Option<String>,
    #[serde(default)]
    pub test_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unequal_length_info: Option<UnequalLengthInfo>,
}

impl TestCase {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.testname.as_deref()
    }

    /// Master script text, empty when the record has none.
    #[must_use]
    pub fn master_script(&self) -> &str {
        self.master_script.as_deref().unwrap_or_default()
    }

    /// Test script text, empty when the record has none.
    #[must_use]
    pub fn test_script(&self) -> &str {
        self.test_script.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn outcome(&self) -> TestOutcome {
        if self.test_status.contains(FAIL_MARKER) {
            TestOutcome::Failed
        } else {
            TestOutcome::Passed
        }
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.outcome() {
            TestOutcome::Passed => None,
            TestOutcome::Failed if self.test_status.contains(UNEQUAL_LENGTH_MARKER) => {
                Some(FailureKind::UnequalLengths)
            }
            TestOutcome::Failed => Some(FailureKind::Threshold),
        }
    }

    /// `false` only for unequal-length failures, which have no meaningful
    /// waypoint pairing.
    #[must_use]
    pub fn is_deviation_eligible(&self) -> bool {
        self.failure_kind() != Some(FailureKind::UnequalLengths)
    }

    /// First space-separated word of the test name.
    #[must_use]
    pub fn category(&self) -> &str {
        match self.testname.as_deref() {
            Some(name) if !name.is_empty() => name.split(' ').next().unwrap_or(name),
            _ => CATEGORY_FALLBACK,
        }
    }

    /// Calendar date of `startdate`, if it is in one of the known layouts.
    #[must_use]
    pub fn start_date(&self) -> Option<Date> {
        self.startdate.as_deref().and_then(parse_date)
    }
}

/// Decode a log document: a JSON array of test case records.
pub fn parse_log_str(input: &str) -> LogResult<Vec<TestCase>> {
    if input.trim().is_empty() {
        return Err(LogError::Empty);
    }

    let cases: Vec<TestCase> = serde_json::from_str(input)?;
    log::debug!("decoded {} test cases", cases.len());
    Ok(cases)
}

/// Date of a timestamp in RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` (fractional seconds allowed) or `YYYY-MM-DD` form.
#[must_use]
pub fn parse_date(input: &str) -> Option<Date> {
    let input = input.trim();

    if let Ok(datetime) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(datetime.date());
    }

    let whole_seconds = input.split('.').next().unwrap_or(input);
    PrimitiveDateTime::parse(
        whole_seconds,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            whole_seconds,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .map(PrimitiveDateTime::date)
    .or_else(|_| Date::parse(input, format_description!("[year]-[month]-[day]")))
    .ok()
}
