use serde::Serialize;

use crate::analysis::DeviationReport;
use crate::geom::Axis;

use super::ChartOptions;

const LINES_TITLE: &str = "Absolute Deviations per Axis";
const HEATMAP_TITLE: &str = "Deviation Heatmap";
const COLORSCALE: &str = "RdBu";
const HOVER_TEMPLATE: &str = "x = %{x}<br>y = %{y}<br>Diff = %{z}<extra></extra>";

/// `|deviation|` of one axis, indexed by move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSeries {
    pub name: String,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub tickvals: [f64; 3],
    pub ticktext: [&'static str; 3],
    pub len: f64,
}

/// Signed deviations, one row per move and one column per axis.
///
/// The color range is symmetric around zero so a zero deviation always maps
/// to the middle of the scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub z: Vec<[f64; 3]>,
    pub x: [&'static str; 3],
    pub y: Vec<String>,
    pub colorscale: &'static str,
    pub zmid: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub colorbar: ColorBar,
    pub hovertemplate: &'static str,
}

impl Heatmap {
    fn from_report(report: &DeviationReport) -> Self {
        let limit = report.max_abs();
        Self {
            z: report.deviations.iter().map(|d| d.to_array()).collect(),
            x: Axis::ALL.map(Axis::label),
            y: (1..=report.len()).map(|n| format!("Move {n}")).collect(),
            colorscale: COLORSCALE,
            zmid: 0.0,
            zmin: -limit,
            zmax: limit,
            colorbar: ColorBar {
                tickvals: [-limit, 0.0, limit],
                ticktext: ["Low", "0", "High"],
                len: 0.6,
            },
            hovertemplate: HOVER_TEMPLATE,
        }
    }
}

/// Two-panel chart: per-axis deviation lines next to a heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationChart {
    pub subplot_titles: [&'static str; 2],
    pub template: String,
    pub height: u32,
    #[serde(rename = "showlegend")]
    pub show_legend: bool,
    pub axis_series: Vec<AxisSeries>,
    pub heatmap: Heatmap,
}

impl DeviationChart {
    #[must_use]
    pub fn new(report: &DeviationReport, options: &ChartOptions) -> Self {
        let axis_series = Axis::ALL
            .iter()
            .map(|axis| AxisSeries {
                name: format!("{axis}-axis"),
                y: report.abs_series(*axis),
            })
            .collect();

        Self {
            subplot_titles: [LINES_TITLE, HEATMAP_TITLE],
            template: options.template.clone(),
            height: options.deviation_height,
            show_legend: true,
            axis_series,
            heatmap: Heatmap::from_report(report),
        }
    }
}
