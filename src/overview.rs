//! Pass/fail statistics over a whole test log.
//!
//! The overview feeds the dashboard's home page: the result distribution, the
//! per-category breakdown and the per-day trend. [`CaseFilter`] narrows the log
//! to the cases a user picked before one is analysed in detail.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use time::Date;

use crate::parse::test_log::{FailureKind, TestCase, TestOutcome};

/// Passed/failed counters for one bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
}

impl StatusCounts {
    fn record(&mut self, outcome: TestOutcome) {
        match outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Aggregate counts over a set of test cases.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LogOverview {
    pub totals: StatusCounts,
    pub unequal_length_failures: usize,
    pub threshold_failures: usize,
    /// Keyed by category, in name order.
    pub by_category: BTreeMap<String, StatusCounts>,
    /// Keyed by `YYYY-MM-DD`, in date order.
    pub by_date: BTreeMap<String, StatusCounts>,
    /// Cases whose `startdate` is missing or unreadable.
    pub undated: usize,
}

impl LogOverview {
    #[must_use]
    pub fn from_cases(cases: &[TestCase]) -> Self {
        let mut overview = Self::default();
        let mut by_date: BTreeMap<Date, StatusCounts> = BTreeMap::new();

        for case in cases {
            let outcome = case.outcome();
            overview.totals.record(outcome);

            match case.failure_kind() {
                Some(FailureKind::UnequalLengths) => overview.unequal_length_failures += 1,
                Some(FailureKind::Threshold) => overview.threshold_failures += 1,
                None => {}
            }

            overview
                .by_category
                .entry(case.category().to_owned())
                .or_default()
                .record(outcome);

            match case.start_date() {
                Some(date) => by_date.entry(date).or_default().record(outcome),
                None => {
                    log::warn!(
                        "test `{}` has no readable start date: {:?}",
                        case.name().unwrap_or_default(),
                        case.startdate
                    );
                    overview.undated += 1;
                }
            }
        }

        overview.by_date = by_date
            .into_iter()
            .map(|(date, counts)| (date.to_string(), counts))
            .collect();
        overview
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"total:{n} passed:{p} failed:{f} [breakdown...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "total:{} passed:{} failed:{}",
            self.totals.total(),
            self.totals.passed,
            self.totals.failed
        )];

        if self.unequal_length_failures > 0 {
            parts.push(format!("unequal-length:{}", self.unequal_length_failures));
        }
        if self.threshold_failures > 0 {
            parts.push(format!("threshold:{}", self.threshold_failures));
        }
        if self.undated > 0 {
            parts.push(format!("undated:{}", self.undated));
        }

        parts.join(" ")
    }
}

impl fmt::Display for LogOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test Results:")?;
        writeln!(f, "  Total: {}", self.totals.total())?;
        writeln!(f, "  Passed: {}", self.totals.passed)?;
        writeln!(f, "  Failed: {}", self.totals.failed)?;

        if self.totals.failed > 0 {
            writeln!(f, "  Failure types:")?;
            writeln!(
                f,
                "    - {}: {}",
                FailureKind::UnequalLengths.label(),
                self.unequal_length_failures
            )?;
            writeln!(
                f,
                "    - {}: {}",
                FailureKind::Threshold.label(),
                self.threshold_failures
            )?;
        }

        if !self.by_category.is_empty() {
            writeln!(f, "  Categories:")?;
            for (category, counts) in &self.by_category {
                writeln!(
                    f,
                    "    - {category}: {} passed, {} failed",
                    counts.passed, counts.failed
                )?;
            }
        }

        if !self.by_date.is_empty() {
            writeln!(f, "  Trend:")?;
            for (date, counts) in &self.by_date {
                writeln!(f, "    - {date}: {} passed, {} failed", counts.passed, counts.failed)?;
            }
        }

        if self.undated > 0 {
            writeln!(f, "  Undated: {}", self.undated)?;
        }

        Ok(())
    }
}

/// Selection of cases by outcome, failure kind, category and day.
///
/// Unset criteria match everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaseFilter {
    pub outcome: Option<TestOutcome>,
    pub failure_kinds: Vec<FailureKind>,
    pub category: Option<String>,
    pub date: Option<Date>,
}

impl CaseFilter {
    #[must_use]
    pub fn matches(&self, case: &TestCase) -> bool {
        if self.outcome.is_some_and(|outcome| case.outcome() != outcome) {
            return false;
        }
        if !self.failure_kinds.is_empty()
            && !case
                .failure_kind()
                .is_some_and(|kind| self.failure_kinds.contains(&kind))
        {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| case.category() != category)
        {
            return false;
        }
        if self.date.is_some_and(|date| case.start_date() != Some(date)) {
            return false;
        }
        true
    }
}

/// Cases of `cases` accepted by `filter`, in log order.
#[must_use]
pub fn filter_cases<'a>(cases: &'a [TestCase], filter: &CaseFilter) -> Vec<&'a TestCase> {
    cases.iter().filter(|case| filter.matches(case)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn case(name: &str, date: &str, status: &str) -> TestCase {
        TestCase {
            testname: Some(name.to_owned()),
            startdate: Some(date.to_owned()),
            test_status: status.to_owned(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<TestCase> {
        vec![
            case("Linear l1", "2024-11-05 09:00:00", "PASS"),
            case("Linear l2", "2024-11-05 09:05:00", "FAIL: threshold"),
            case("Circle c1", "2024-11-06 10:00:00", "FAIL: Files have unequal lengths."),
            case("Circle c2", "not a date", "PASS"),
        ]
    }

    #[test]
    fn counts_outcomes_categories_and_days() {
        let overview = LogOverview::from_cases(&sample());

        assert_eq!(overview.totals, StatusCounts { passed: 2, failed: 2 });
        assert_eq!(overview.unequal_length_failures, 1);
        assert_eq!(overview.threshold_failures, 1);
        assert_eq!(
            overview.by_category.keys().collect::<Vec<_>>(),
            ["Circle", "Linear"]
        );
        assert_eq!(overview.by_category["Linear"], StatusCounts { passed: 1, failed: 1 });
        assert_eq!(overview.by_date["2024-11-05"].total(), 2);
        assert_eq!(overview.by_date["2024-11-06"].failed, 1);
        assert_eq!(overview.undated, 1);
    }

    #[test]
    fn summary_and_display() {
        let overview = LogOverview::from_cases(&sample());

        let summary = overview.summary();
        assert!(summary.contains("total:4"));
        assert!(summary.contains("unequal-length:1"));
        assert!(summary.contains("undated:1"));

        let output = format!("{overview}");
        assert!(output.contains("Failed: 2"));
        assert!(output.contains("Fail due to threshold: 1"));
        assert!(output.contains("Linear: 1 passed, 1 failed"));
    }

    #[test]
    fn filter_combines_criteria() {
        let cases = sample();

        let failed = CaseFilter {
            outcome: Some(TestOutcome::Failed),
            failure_kinds: vec![FailureKind::Threshold],
            ..Default::default()
        };
        let names: Vec<_> = filter_cases(&cases, &failed)
            .iter()
            .filter_map(|case| case.name())
            .collect();
        assert_eq!(names, ["Linear l2"]);

        let day = CaseFilter {
            date: Some(date!(2024 - 11 - 05)),
            category: Some("Linear".to_owned()),
            ..Default::default()
        };
        assert_eq!(filter_cases(&cases, &day).len(), 2);
        assert_eq!(filter_cases(&cases, &CaseFilter::default()).len(), 4);
    }
}
