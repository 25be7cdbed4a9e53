use serde::Serialize;

use crate::geom::{Axis, AxisTriple, Point3};

use super::ChartOptions;

const TITLE: &str = "3D Comparison of Robot Paths";
const MODE: &str = "lines+markers";
const LINE_WIDTH: u32 = 4;
const MARKER_SIZE: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub size: u32,
}

/// One polyline of the 3D scene, split into coordinate columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathTrace {
    pub name: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub mode: &'static str,
    pub line: LineStyle,
    pub marker: MarkerStyle,
}

impl PathTrace {
    fn from_points(name: &'static str, points: &[Point3], line: LineStyle) -> Self {
        let column = |axis: Axis| points.iter().map(|p| p.coordinate(axis)).collect();
        Self {
            name,
            x: column(Axis::X),
            y: column(Axis::Y),
            z: column(Axis::Z),
            mode: MODE,
            line,
            marker: MarkerStyle { size: MARKER_SIZE },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneAxis {
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneCamera {
    pub eye: AxisTriple,
}

/// Layout of the 3D scene: `scene.xaxis.title`, `scene.camera.eye` and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayout {
    pub xaxis: SceneAxis,
    pub yaxis: SceneAxis,
    pub zaxis: SceneAxis,
    pub camera: SceneCamera,
}

/// Master and test path overlaid in one 3D scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathChart {
    pub title: &'static str,
    pub template: String,
    pub height: u32,
    #[serde(rename = "showlegend")]
    pub show_legend: bool,
    pub scene: SceneLayout,
    pub master: PathTrace,
    pub test: PathTrace,
}

impl PathChart {
    /// Build the overlay from the paired waypoints.
    ///
    /// Both paths are cut to the shorter length, so waypoints without a
    /// counterpart are never drawn.
    #[must_use]
    pub fn new(master: &[Point3], test: &[Point3], options: &ChartOptions) -> Self {
        let pairs = master.len().min(test.len());
        let [eye_x, eye_y, eye_z] = options.camera_eye;

        Self {
            title: TITLE,
            template: options.template.clone(),
            height: options.path_height,
            show_legend: true,
            scene: SceneLayout {
                xaxis: SceneAxis { title: "X Axis (mm)" },
                yaxis: SceneAxis { title: "Y Axis (mm)" },
                zaxis: SceneAxis { title: "Z Axis (mm)" },
                camera: SceneCamera {
                    eye: AxisTriple::new(eye_x, eye_y, eye_z),
                },
            },
            master: PathTrace::from_points(
                "Master Path",
                &master[..pairs],
                LineStyle {
                    color: "blue",
                    width: LINE_WIDTH,
                    dash: None,
                },
            ),
            test: PathTrace::from_points(
                "Test Path",
                &test[..pairs],
                LineStyle {
                    color: "red",
                    width: LINE_WIDTH,
                    dash: Some("dash"),
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_points_into_columns_in_order() {
        let master = [Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)];
        let test = [Point3::new(1.5, 2.5, 3.5), Point3::new(4.5, 5.5, 6.5)];

        let chart = PathChart::new(&master, &test, &ChartOptions::default());
        assert_eq!(chart.master.x, vec![1.0, 4.0]);
        assert_eq!(chart.master.y, vec![2.0, 5.0]);
        assert_eq!(chart.master.z, vec![3.0, 6.0]);
        assert_eq!(chart.test.z, vec![3.5, 6.5]);
        assert_eq!(chart.height, 800);
        assert_eq!(chart.test.line.dash, Some("dash"));
    }

    #[test]
    fn unpaired_waypoints_are_not_drawn() {
        let master = [Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)];
        let test = [Point3::new(1.0, 2.0, 3.0)];

        let chart = PathChart::new(&master, &test, &ChartOptions::default());
        assert_eq!(chart.master.len(), 1);
        assert_eq!(chart.test.len(), 1);
    }

    #[test]
    fn serializes_with_plotly_keys() {
        let points = [Point3::new(1.0, 2.0, 3.0)];
        let chart = PathChart::new(&points, &points, &ChartOptions::default());
        let json = serde_json::to_value(&chart).expect("serializable");

        assert_eq!(json["master"]["marker"]["size"], 6);
        assert_eq!(json["scene"]["zaxis"]["title"], "Z Axis (mm)");
        assert_eq!(json["scene"]["camera"]["eye"]["y"], 1.5);
        assert_eq!(json["showlegend"], true);
        assert_eq!(json["test"]["line"]["dash"], "dash");
    }
}
