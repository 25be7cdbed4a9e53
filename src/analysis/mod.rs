//! Deviation analysis between a master and a test path.

pub mod deviation;

pub use deviation::{
    AnalysisError, AnalysisResult, DeviationAnalyzer, DeviationReport, SequenceRole,
};
