pub mod presets;
pub mod primitives;
pub mod volume;

use std::fmt;
use std::sync::Arc;

use crate::math::Vec3;

pub use presets::{build_scene, SceneError};
pub use volume::{VolumeError, VolumetricField};

/// A signed distance bound over 3D space.
///
/// The sign of `evaluate` tells inside (negative) from outside (positive) and
/// its magnitude never exceeds the true distance to the nearest surface.
/// Implementations must be pure: the same point always yields the same value.
pub trait DistanceField: Send + Sync {
    fn evaluate(&self, p: Vec3) -> f32;

    /// An empty field has no surface anywhere and every ray misses it.
    fn is_empty(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> DistanceField for F
where
    F: Fn(Vec3) -> f32 + Send + Sync,
{
    fn evaluate(&self, p: Vec3) -> f32 {
        self(p)
    }
}

/// Analytic scene function supplied from outside the renderer.
#[derive(Clone)]
pub struct AnalyticField {
    name: String,
    function: Arc<dyn Fn(Vec3) -> f32 + Send + Sync>,
}

impl AnalyticField {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Vec3) -> f32 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Arc::new(function),
        }
    }
}

impl DistanceField for AnalyticField {
    fn evaluate(&self, p: Vec3) -> f32 {
        (self.function)(p)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for AnalyticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticField")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
