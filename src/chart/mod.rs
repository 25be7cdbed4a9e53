//! Chart-ready data for the dashboard.
//!
//! Traces, the 3D scene and the heatmap serialize with plotly's own keys
//! (`marker.size`, `scene.camera.eye`, `zmid`, ...). Each chart wraps its
//! traces together with the layout fields the UI copies into `layout`
//! (`height`, `template`, `showlegend`). Everything holds plain numbers and
//! labels and serializes with serde.

mod deviation;
mod path;

pub use deviation::{AxisSeries, ColorBar, DeviationChart, Heatmap};
pub use path::{
    LineStyle, MarkerStyle, PathChart, PathTrace, SceneAxis, SceneCamera, SceneLayout,
};

use serde::Serialize;

/// Layout settings shared by both charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    /// Height of the 3D path chart in pixels.
    pub path_height: u32,
    /// Height of the two-panel deviation chart in pixels.
    pub deviation_height: u32,
    /// Renderer template name.
    pub template: String,
    /// Camera eye position of the 3D scene.
    pub camera_eye: [f64; 3],
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            path_height: 800,
            deviation_height: 500,
            template: "plotly_white".to_owned(),
            camera_eye: [1.5, 1.5, 1.5],
        }
    }
}
