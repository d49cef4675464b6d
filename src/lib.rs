//! Sphere-tracing renderer for scenes described by signed distance fields.
//!
//! Fields come either from analytic functions or from sampled volumetric
//! grids. Each frame is rendered on the CPU, one independent task per pixel.

pub mod config;
pub mod field;
pub mod math;
pub mod render;
pub mod state;
pub mod watcher;

pub use field::{AnalyticField, DistanceField, VolumetricField};
pub use math::{Ray, Vec3};
