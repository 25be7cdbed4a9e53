//! Per-test-case pipeline: extract both paths, compare them, prepare output.

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::analysis::{AnalysisError, DeviationAnalyzer, DeviationReport};
use crate::chart::{ChartOptions, DeviationChart, PathChart};
use crate::geom::AxisTriple;
use crate::parse::robot_script::{
    CoordinateExtractor, CoordinateSequence, ParseError, ScriptCoordinateExtractor,
};
use crate::parse::test_log::TestCase;

const UNKNOWN_TEST: &str = "Unknown Test";

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("master script: {0}")]
    MasterScript(#[source] ParseError),
    #[error("test script: {0}")]
    TestScript(#[source] ParseError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Summary handed to the UI next to the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    pub test_name: String,
    pub test_date: String,
    pub test_status: String,
    pub max_deviation: AxisTriple,
    pub mean_deviation: AxisTriple,
}

/// Extracted paths of one test case together with their deviation report.
///
/// Construction runs the whole computation, so a value of this type always
/// renders completely.
#[derive(Debug, Clone, PartialEq)]
pub struct PathComparison {
    pub test_name: String,
    pub test_date: String,
    pub test_status: String,
    pub master_moves: CoordinateSequence,
    pub test_moves: CoordinateSequence,
    pub report: DeviationReport,
}

impl PathComparison {
    pub fn from_test_case(case: &TestCase) -> Result<Self, ComparisonError> {
        Self::with_extractor(case, &ScriptCoordinateExtractor::default())
    }

    pub fn with_extractor(
        case: &TestCase,
        extractor: &impl CoordinateExtractor,
    ) -> Result<Self, ComparisonError> {
        let master_moves = extractor
            .extract(case.master_script())
            .map_err(ComparisonError::MasterScript)?;
        let test_moves = extractor
            .extract(case.test_script())
            .map_err(ComparisonError::TestScript)?;
        log::debug!(
            "comparing {} master and {} test waypoints",
            master_moves.len(),
            test_moves.len()
        );

        let report = DeviationAnalyzer::new().analyze(&master_moves, &test_moves)?;

        Ok(Self {
            test_name: case.name().unwrap_or(UNKNOWN_TEST).to_owned(),
            test_date: case.startdate.clone().unwrap_or_else(now_timestamp),
            test_status: case.test_status.clone(),
            master_moves,
            test_moves,
            report,
        })
    }

    #[must_use]
    pub fn insights_report(&self) -> InsightsReport {
        InsightsReport {
            test_name: self.test_name.clone(),
            test_date: self.test_date.clone(),
            test_status: self.test_status.clone(),
            max_deviation: self.report.max_deviation,
            mean_deviation: self.report.mean_deviation,
        }
    }

    #[must_use]
    pub fn path_chart(&self, options: &ChartOptions) -> PathChart {
        PathChart::new(&self.master_moves, &self.test_moves, options)
    }

    #[must_use]
    pub fn deviation_chart(&self, options: &ChartOptions) -> DeviationChart {
        DeviationChart::new(&self.report, options)
    }
}

fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;

    fn case(master: &str, test: &str) -> TestCase {
        TestCase {
            testname: Some("Linear square".to_owned()),
            startdate: Some("2024-11-05 10:15:00".to_owned()),
            test_status: "FAIL: deviation above threshold".to_owned(),
            master_script: Some(master.to_owned()),
            test_script: Some(test.to_owned()),
            unequal_length_info: None,
        }
    }

    #[test]
    fn longer_master_is_truncated_to_test_length() {
        let comparison = PathComparison::from_test_case(&case(
            "p1 := CalcRobT([[1,2,3]]); p2 := CalcRobT([[4,5,6]]);",
            "p1 := CalcRobT([[1,2,3]]);",
        ))
        .expect("comparable");

        assert_eq!(comparison.master_moves.len(), 2);
        assert_eq!(comparison.test_moves.len(), 1);
        assert_eq!(comparison.report.deviations, vec![Vec3::ZERO]);

        let insights = comparison.insights_report();
        assert_eq!(insights.test_name, "Linear square");
        assert_eq!(insights.max_deviation, AxisTriple::default());
        assert_eq!(insights.mean_deviation, AxisTriple::default());
    }

    #[test]
    fn script_without_calls_cannot_be_compared() {
        let err = PathComparison::from_test_case(&case("MoveJ home;", "CalcRobT([[1,2,3]])"))
            .expect_err("empty master");
        assert!(matches!(
            err,
            ComparisonError::Analysis(AnalysisError::EmptySequence { master: 0, test: 1 })
        ));
    }

    #[test]
    fn parse_errors_name_the_script() {
        let record = case("CalcRobT([[1,2,3]])", "CalcRobT([[1.5,2]])");
        let err = PathComparison::from_test_case(&record).expect_err("test script malformed");
        assert!(matches!(err, ComparisonError::TestScript(_)));
        assert!(err.to_string().starts_with("test script:"));
    }

    #[test]
    fn missing_name_and_date_get_defaults() {
        let mut record = case("CalcRobT([[0,0,0]])", "CalcRobT([[3,4,0]])");
        record.testname = None;
        record.startdate = None;

        let insights = PathComparison::from_test_case(&record)
            .expect("comparable")
            .insights_report();
        assert_eq!(insights.test_name, "Unknown Test");
        assert_eq!(insights.test_date.len(), "2024-11-05 10:15:00".len());
        assert_eq!(insights.max_deviation, AxisTriple::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn insights_serialize_with_axis_keys() {
        let record = case("CalcRobT([[0,0,0]])", "CalcRobT([[3,4,0]])");
        let insights = PathComparison::from_test_case(&record)
            .expect("comparable")
            .insights_report();
        let json = serde_json::to_value(&insights).expect("serializable");

        assert_eq!(json["max_deviation"]["y"], 4.0);
        assert_eq!(json["mean_deviation"]["x"], 3.0);
        assert_eq!(json["test_date"], "2024-11-05 10:15:00");
    }
}
