//! Positional comparison of a master and a test waypoint sequence.

use std::fmt;

use thiserror::Error;

use crate::geom::{Axis, AxisTriple, Point3, Vec3};

/// Result type for deviation analysis.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Which of the two compared sequences a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceRole {
    Master,
    Test,
}

impl fmt::Display for SequenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str("master"),
            Self::Test => f.write_str("test"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The shorter sequence has no waypoints, so nothing can be paired.
    #[error("no waypoint pairs to compare (master has {master}, test has {test})")]
    EmptySequence { master: usize, test: usize },
    /// A raw waypoint row is not three-dimensional.
    #[error("{sequence} waypoint {index} has {dimension} coordinates, expected 3")]
    Shape {
        sequence: SequenceRole,
        index: usize,
        dimension: usize,
    },
    /// A paired waypoint holds `inf` or `nan`.
    #[error("{sequence} waypoint {index} has a non-finite coordinate")]
    NonFinite { sequence: SequenceRole, index: usize },
}

/// Deviation vectors of the aligned waypoint pairs plus per-axis statistics.
///
/// `deviations[i]` is `master[i] - test[i]`; the statistics are over absolute
/// values. The report never covers waypoints past the shorter sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationReport {
    pub deviations: Vec<Vec3>,
    pub max_deviation: AxisTriple,
    pub mean_deviation: AxisTriple,
}

impl DeviationReport {
    /// Number of compared waypoint pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deviations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deviations.is_empty()
    }

    /// `|deviation[i][axis]|` for every move.
    #[must_use]
    pub fn abs_series(&self, axis: Axis) -> Vec<f64> {
        self.deviations
            .iter()
            .map(|deviation| deviation[axis].abs())
            .collect()
    }

    /// Largest absolute deviation over all moves and axes.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.deviations
            .iter()
            .map(|deviation| deviation.max_abs_component())
            .fold(0.0, f64::max)
    }
}

/// Index-by-index comparison of two waypoint sequences.
///
/// Waypoint `i` of the master is compared with waypoint `i` of the test only,
/// truncated to the shorter sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviationAnalyzer;

impl DeviationAnalyzer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn analyze(&self, master: &[Point3], test: &[Point3]) -> AnalysisResult<DeviationReport> {
        let min_len = master.len().min(test.len());
        if min_len == 0 {
            return Err(AnalysisError::EmptySequence {
                master: master.len(),
                test: test.len(),
            });
        }

        let dropped = master.len().max(test.len()) - min_len;
        if dropped > 0 {
            log::debug!(
                "pairing {min_len} waypoints, ignoring {dropped} trailing waypoints of the longer sequence"
            );
        }

        let master = &master[..min_len];
        let test = &test[..min_len];
        ensure_finite(SequenceRole::Master, master)?;
        ensure_finite(SequenceRole::Test, test)?;

        let deviations: Vec<Vec3> = master
            .iter()
            .zip(test)
            .map(|(expected, actual)| *expected - *actual)
            .collect();

        let mut max = Vec3::ZERO;
        let mut sum = Vec3::ZERO;
        for deviation in &deviations {
            let abs = deviation.abs();
            max = max.max(abs);
            sum = Vec3::new(sum.x + abs.x, sum.y + abs.y, sum.z + abs.z);
        }
        let count = deviations.len() as f64;

        Ok(DeviationReport {
            max_deviation: AxisTriple::from(max),
            mean_deviation: AxisTriple::new(sum.x / count, sum.y / count, sum.z / count),
            deviations,
        })
    }

    /// Like [`DeviationAnalyzer::analyze`] for untyped coordinate rows, which
    /// are checked to be three-dimensional first.
    pub fn analyze_rows(
        &self,
        master: &[Vec<f64>],
        test: &[Vec<f64>],
    ) -> AnalysisResult<DeviationReport> {
        let master = rows_to_points(SequenceRole::Master, master)?;
        let test = rows_to_points(SequenceRole::Test, test)?;
        self.analyze(&master, &test)
    }
}

fn ensure_finite(sequence: SequenceRole, points: &[Point3]) -> AnalysisResult<()> {
    match points.iter().position(|point| !point.is_finite()) {
        Some(index) => Err(AnalysisError::NonFinite { sequence, index }),
        None => Ok(()),
    }
}

fn rows_to_points(sequence: SequenceRole, rows: &[Vec<f64>]) -> AnalysisResult<Vec<Point3>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| match row.as_slice() {
            [x, y, z] => Ok(Point3::new(*x, *y, *z)),
            _ => Err(AnalysisError::Shape {
                sequence,
                index,
                dimension: row.len(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[[f64; 3]]) -> Vec<Point3> {
        coords.iter().copied().map(Point3::from_array).collect()
    }

    #[test]
    fn single_pair_keeps_sign_in_vectors_only() {
        let report = DeviationAnalyzer::new()
            .analyze(&points(&[[0.0, 0.0, 0.0]]), &points(&[[3.0, 4.0, 0.0]]))
            .expect("one pair");

        assert_eq!(report.deviations, vec![Vec3::new(-3.0, -4.0, 0.0)]);
        assert_eq!(report.max_deviation, AxisTriple::new(3.0, 4.0, 0.0));
        assert_eq!(report.mean_deviation, report.max_deviation);
    }

    #[test]
    fn truncates_to_shorter_sequence() {
        let master = points(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let test = points(&[[1.0, 2.0, 3.0]]);

        let report = DeviationAnalyzer::new().analyze(&master, &test).expect("one pair");
        assert_eq!(report.len(), 1);
        assert_eq!(report.deviations[0], Vec3::ZERO);
        assert_eq!(report.max_deviation, AxisTriple::default());
        assert_eq!(report.mean_deviation, AxisTriple::default());
    }

    #[test]
    fn statistics_are_over_absolute_values() {
        let master = points(&[[1.0, 0.0, 0.0], [-1.0, 2.0, 0.0], [0.0, 0.0, 6.0]]);
        let test = points(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [9.0, 9.0, 9.0]]);

        let report = DeviationAnalyzer::new().analyze(&master, &test).expect("three pairs");
        assert_eq!(report.len(), 3);
        assert_eq!(report.max_deviation, AxisTriple::new(1.0, 2.0, 6.0));
        assert_eq!(report.mean_deviation, AxisTriple::new(2.0 / 3.0, 2.0 / 3.0, 2.0));
        assert_eq!(report.abs_series(Axis::X), vec![1.0, 1.0, 0.0]);
        assert_eq!(report.max_abs(), 6.0);

        for axis in Axis::ALL {
            assert!(report.max_deviation.get(axis) >= report.mean_deviation.get(axis));
            assert!(report.mean_deviation.get(axis) >= 0.0);
        }
    }

    #[test]
    fn empty_side_is_an_error() {
        let err = DeviationAnalyzer::new()
            .analyze(&[], &points(&[[1.0, 1.0, 1.0]]))
            .expect_err("nothing to pair");
        assert_eq!(err, AnalysisError::EmptySequence { master: 0, test: 1 });
    }

    #[test]
    fn rows_must_be_three_dimensional() {
        let master = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];
        let test = vec![vec![1.0, 2.0, 3.0]];

        let err = DeviationAnalyzer::new()
            .analyze_rows(&master, &test)
            .expect_err("second master row is 2D");
        assert_eq!(
            err,
            AnalysisError::Shape {
                sequence: SequenceRole::Master,
                index: 1,
                dimension: 2,
            }
        );
    }

    #[test]
    fn non_finite_pair_is_rejected() {
        let master = points(&[[0.0, 0.0, 0.0], [f64::INFINITY, 0.0, 0.0]]);
        let test = points(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);

        let err = DeviationAnalyzer::new().analyze(&master, &test).expect_err("inf");
        assert_eq!(
            err,
            AnalysisError::NonFinite {
                sequence: SequenceRole::Master,
                index: 1,
            }
        );
    }

    #[test]
    fn non_finite_trailing_waypoint_is_ignored() {
        let master = points(&[[0.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0]]);
        let test = points(&[[1.0, 0.0, 0.0]]);

        let report = DeviationAnalyzer::new().analyze(&master, &test).expect("one pair");
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn repeated_analysis_is_bit_identical() {
        let master = points(&[[0.1, 0.2, 0.3], [10.5, -3.25, 7.0]]);
        let test = points(&[[0.3, 0.1, 0.0], [10.0, -3.0, 7.125]]);
        let analyzer = DeviationAnalyzer::new();

        let first = analyzer.analyze(&master, &test).expect("ok");
        let second = analyzer.analyze(&master, &test).expect("ok");
        assert_eq!(first, second);
    }
}
