//! Basic 3D value types shared by extraction, analysis and charting.

mod core;

pub use core::{Axis, AxisTriple, Point3, Vec3};
