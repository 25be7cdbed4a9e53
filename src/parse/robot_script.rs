//! Waypoint extraction from RAPID robot scripts.
//!
//! Only one call shape is recognized: `CalcRobT([[x, y, z], ...], ...)`. The
//! text between `CalcRobT([[` and the first `]` is captured and its first three
//! comma-separated values become one waypoint. Anything else in the script is
//! ignored.

use std::num::ParseFloatError;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::geom::Point3;

/// Ordered waypoints in the order their calls appear in the script.
pub type CoordinateSequence = Vec<Point3>;

/// Result type for waypoint extraction.
pub type ParseResult<T> = Result<T, ParseError>;

/// Name of the robtarget-construction call scanned for by default.
pub const DEFAULT_CALL: &str = "CalcRobT";

static CALC_ROBT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    build_pattern(DEFAULT_CALL).expect("default CalcRobT pattern is a valid regex")
});

/// Errors raised while turning a matched call into a waypoint.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The captured coordinate text holds fewer than three values.
    #[error("match {index}: expected 3 coordinates, found {found} in `{text}`")]
    TooFewValues {
        index: usize,
        found: usize,
        text: String,
    },
    /// One of the first three values is not a number.
    #[error("match {index}: invalid coordinate `{token}`: {source}")]
    InvalidNumber {
        index: usize,
        token: String,
        #[source]
        source: ParseFloatError,
    },
    /// A custom call name produced an unusable pattern.
    #[error("invalid call pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Anything that can turn script text into a waypoint sequence.
///
/// Deviation analysis only depends on this trait, so a grammar-aware parser can
/// replace the regex scanner without touching it.
pub trait CoordinateExtractor {
    fn extract(&self, script: &str) -> ParseResult<CoordinateSequence>;
}

/// Regex-based scanner for `<call>([[x, y, z]` occurrences.
#[derive(Debug, Clone)]
pub struct ScriptCoordinateExtractor {
    pattern: Regex,
}

impl Default for ScriptCoordinateExtractor {
    fn default() -> Self {
        Self {
            pattern: CALC_ROBT_PATTERN.clone(),
        }
    }
}

impl ScriptCoordinateExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan for a different call name with the same argument shape.
    pub fn for_call(name: &str) -> ParseResult<Self> {
        Ok(Self {
            pattern: build_pattern(name)?,
        })
    }
}

impl CoordinateExtractor for ScriptCoordinateExtractor {
    fn extract(&self, script: &str) -> ParseResult<CoordinateSequence> {
        let moves = self
            .pattern
            .captures_iter(script)
            .enumerate()
            .map(|(index, captures)| {
                let text = captures.get(1).map_or("", |m| m.as_str());
                parse_indexed(index, text)
            })
            .collect::<ParseResult<CoordinateSequence>>()?;

        log::debug!("extracted {} waypoints", moves.len());
        Ok(moves)
    }
}

/// Extract all `CalcRobT` waypoints from `script`.
pub fn extract_coordinates(script: &str) -> ParseResult<CoordinateSequence> {
    ScriptCoordinateExtractor::default().extract(script)
}

/// Parse one captured coordinate string such as `"500.0, -20, 310.5, 1"`.
///
/// Values beyond the third are ignored.
pub fn parse_coordinate_text(text: &str) -> ParseResult<Point3> {
    parse_indexed(0, text)
}

fn parse_indexed(index: usize, text: &str) -> ParseResult<Point3> {
    let tokens: Vec<&str> = text.split(',').take(3).collect();
    if tokens.len() < 3 {
        return Err(ParseError::TooFewValues {
            index,
            found: tokens.len(),
            text: text.to_owned(),
        });
    }

    let mut coords = [0.0; 3];
    for (slot, token) in coords.iter_mut().zip(tokens) {
        let token = token.trim();
        *slot = token.parse::<f64>().map_err(|source| ParseError::InvalidNumber {
            index,
            token: token.to_owned(),
            source,
        })?;
    }

    Ok(Point3::from_array(coords))
}

fn build_pattern(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{}\(\[\[(.*?)\]", regex::escape(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MOVES: &str = r#"
MODULE MainModule
    PROC main()
        p10 := CalcRobT([[1,2,3],[1,0,0,0],[0,0,0,0],[9E9,9E9,9E9,9E9,9E9,9E9]], tool0);
        MoveL p10, v100, fine, tool0;
        p20 := CalcRobT([[4, 5, 6],[1,0,0,0],[0,0,0,0],[9E9,9E9,9E9,9E9,9E9,9E9]], tool0);
        MoveL p20, v100, fine, tool0;
    ENDPROC
ENDMODULE
"#;

    #[test]
    fn extracts_waypoints_in_source_order() {
        let moves = extract_coordinates(TWO_MOVES).expect("script parses");
        assert_eq!(
            moves,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn script_without_calls_yields_empty_sequence() {
        let moves = extract_coordinates("MoveJ home, v1000, z50, tool0;").expect("no error");
        assert!(moves.is_empty());
        assert!(extract_coordinates("").expect("empty input").is_empty());
    }

    #[test]
    fn extra_values_after_third_are_ignored() {
        let point = parse_coordinate_text(" 500.5, -20 ,1e2, 7, 8").expect("parses");
        assert_eq!(point, Point3::new(500.5, -20.0, 100.0));
    }

    #[test]
    fn two_values_is_a_parse_error() {
        let err = parse_coordinate_text("1.5,2").expect_err("too few values");
        assert!(matches!(err, ParseError::TooFewValues { found: 2, .. }));
    }

    #[test]
    fn non_numeric_value_aborts_whole_extraction() {
        let script = "CalcRobT([[1,2,3]]); CalcRobT([[1,abc,3]]); CalcRobT([[7,8,9]]);";
        let err = extract_coordinates(script).expect_err("second match is invalid");
        match err {
            ParseError::InvalidNumber { index, token, .. } => {
                assert_eq!(index, 1);
                assert_eq!(token, "abc");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn capture_stops_at_first_closing_bracket() {
        // Only the position block is captured, the quaternion block never is.
        let moves = extract_coordinates("CalcRobT([[10,20,30],[0.7,0,0.7,0]], tool0)").expect("ok");
        assert_eq!(moves, vec![Point3::new(10.0, 20.0, 30.0)]);
    }

    #[test]
    fn calls_with_different_shape_are_skipped() {
        let script = "CalcRobT(jpos10, tool0); CalcRobT([p1], tool0); CalcRobT([[1,1,1]]);";
        let moves = extract_coordinates(script).expect("ok");
        assert_eq!(moves, vec![Point3::new(1.0, 1.0, 1.0)]);
    }

    #[test]
    fn custom_call_name_is_escaped() {
        let extractor = ScriptCoordinateExtractor::for_call("Offs.T").expect("valid name");
        let moves = extractor
            .extract("Offs.T([[1,2,3]]); OffsXT([[4,5,6]]); CalcRobT([[7,8,9]])")
            .expect("ok");
        assert_eq!(moves, vec![Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn repeated_extraction_is_identical() {
        let first = extract_coordinates(TWO_MOVES).expect("ok");
        let second = extract_coordinates(TWO_MOVES).expect("ok");
        assert_eq!(first, second);
    }
}
