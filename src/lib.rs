#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod chart;
pub mod comparison;
pub mod geom;
pub mod overview;
pub mod parse;

use std::fmt;

use chart::{ChartOptions, DeviationChart, PathChart};
use comparison::{ComparisonError, InsightsReport, PathComparison};
use overview::LogOverview;
use parse::test_log::{self, LogError, TestCase};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start the rayon thread pool: {err}")))
}

/// Failures surfaced to the dashboard.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no test log has been loaded")]
    NoLogLoaded,
    #[error("unknown test `{0}`")]
    UnknownTest(String),
    /// Unequal-length failures never reach deviation analysis.
    #[error("test `{0}` failed with unequal script lengths and has no deviation analysis")]
    NotEligible(String),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}

#[derive(Debug, Serialize)]
struct TestListEntry<'a> {
    name: &'a str,
    category: &'a str,
    date: Option<&'a str>,
    status: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_type: Option<&'static str>,
    deviation_eligible: bool,
}

impl<'a> From<&'a TestCase> for TestListEntry<'a> {
    fn from(case: &'a TestCase) -> Self {
        Self {
            name: case.name().unwrap_or_default(),
            category: case.category(),
            date: case.startdate.as_deref(),
            status: &case.test_status,
            outcome: case.outcome().label(),
            failure_type: case.failure_kind().map(|kind| kind.label()),
            deviation_eligible: case.is_deviation_eligible(),
        }
    }
}

/// Public entry point for the dashboard.
///
/// Holds the decoded log between calls. Every analysis is recomputed from the
/// stored record on request.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    cases: Option<Vec<TestCase>>,
    chart_options: ChartOptions,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            cases: None,
            chart_options: ChartOptions::default(),
        }
    }

    /// Whether the engine went through its minimal initialization.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Load a JSON test log, replacing any previous one.
    #[wasm_bindgen]
    pub fn load_log(&mut self, json: &str) -> Result<usize, JsValue> {
        self.load_cases(json).map_err(to_js_error)
    }

    /// Name, category, date and classification of every loaded test.
    #[wasm_bindgen]
    pub fn get_tests(&self) -> Result<JsValue, JsValue> {
        let entries: Vec<TestListEntry<'_>> = self
            .loaded()
            .map_err(to_js_error)?
            .iter()
            .map(TestListEntry::from)
            .collect();
        to_js_value(&entries)
    }

    /// The full record of `test_name`: status, both scripts and the extra
    /// lines of unequal-length failures.
    #[wasm_bindgen]
    pub fn get_test(&self, test_name: &str) -> Result<JsValue, JsValue> {
        to_js_value(self.case(test_name).map_err(to_js_error)?)
    }

    #[wasm_bindgen]
    pub fn get_overview(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.overview().map_err(to_js_error)?)
    }

    #[wasm_bindgen]
    pub fn get_insights(&self, test_name: &str) -> Result<JsValue, JsValue> {
        to_js_value(&self.insights(test_name).map_err(to_js_error)?)
    }

    #[wasm_bindgen]
    pub fn get_path_chart(&self, test_name: &str) -> Result<JsValue, JsValue> {
        to_js_value(&self.path_chart(test_name).map_err(to_js_error)?)
    }

    #[wasm_bindgen]
    pub fn get_deviation_chart(&self, test_name: &str) -> Result<JsValue, JsValue> {
        to_js_value(&self.deviation_chart(test_name).map_err(to_js_error)?)
    }

    /// Set the pixel heights of the path and deviation charts.
    #[wasm_bindgen]
    pub fn set_chart_heights(&mut self, path_height: u32, deviation_height: u32) {
        self.chart_options.path_height = path_height;
        self.chart_options.deviation_height = deviation_height;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Decode `json` and keep its cases. Returns the number of cases.
    pub fn load_cases(&mut self, json: &str) -> Result<usize, EngineError> {
        let cases = test_log::parse_log_str(json)?;
        let count = cases.len();
        self.cases = Some(cases);
        Ok(count)
    }

    pub fn cases(&self) -> Result<&[TestCase], EngineError> {
        self.loaded()
    }

    /// The first case named `test_name`.
    pub fn case(&self, test_name: &str) -> Result<&TestCase, EngineError> {
        self.loaded()?
            .iter()
            .find(|case| case.name() == Some(test_name))
            .ok_or_else(|| EngineError::UnknownTest(test_name.to_owned()))
    }

    pub fn overview(&self) -> Result<LogOverview, EngineError> {
        Ok(LogOverview::from_cases(self.loaded()?))
    }

    /// Extract and compare both paths of `test_name`.
    pub fn comparison(&self, test_name: &str) -> Result<PathComparison, EngineError> {
        compare_case(self.case(test_name)?)
    }

    pub fn insights(&self, test_name: &str) -> Result<InsightsReport, EngineError> {
        Ok(self.comparison(test_name)?.insights_report())
    }

    pub fn path_chart(&self, test_name: &str) -> Result<PathChart, EngineError> {
        Ok(self.comparison(test_name)?.path_chart(&self.chart_options))
    }

    pub fn deviation_chart(&self, test_name: &str) -> Result<DeviationChart, EngineError> {
        Ok(self
            .comparison(test_name)?
            .deviation_chart(&self.chart_options))
    }

    pub fn set_chart_options(&mut self, options: ChartOptions) {
        self.chart_options = options;
    }

    #[must_use]
    pub fn chart_options(&self) -> &ChartOptions {
        &self.chart_options
    }

    /// Insights for every eligible case, in log order.
    ///
    /// Each case succeeds or fails on its own; unequal-length failures are
    /// skipped.
    pub fn analyze_all(&self) -> Result<Vec<Result<InsightsReport, EngineError>>, EngineError> {
        let eligible: Vec<&TestCase> = self
            .loaded()?
            .iter()
            .filter(|case| case.is_deviation_eligible())
            .collect();

        #[cfg(feature = "parallel")]
        let iter = eligible.into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = eligible.into_iter();

        Ok(iter
            .map(|case| compare_case(case).map(|comparison| comparison.insights_report()))
            .collect())
    }

    fn loaded(&self) -> Result<&[TestCase], EngineError> {
        self.cases.as_deref().ok_or(EngineError::NoLogLoaded)
    }
}

fn compare_case(case: &TestCase) -> Result<PathComparison, EngineError> {
    if !case.is_deviation_eligible() {
        return Err(EngineError::NotEligible(
            case.name().unwrap_or_default().to_owned(),
        ));
    }
    Ok(PathComparison::from_test_case(case)?)
}

fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
