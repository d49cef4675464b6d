use crate::math::Vec3;

use super::frustum::CameraState;

pub const DEFAULT_EPSILON: f32 = 0.001;
pub const DEFAULT_MAX_DISTANCE: f32 = 100.0;
pub const DEFAULT_MAX_STEPS: u32 = 128;
/// Iteration ceiling for the shadow pass, which is otherwise bounded by distance only.
pub const SHADOW_MAX_STEPS: u32 = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchSettings {
    pub epsilon: f32,
    pub max_distance: f32,
    pub max_steps: u32,
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_distance: DEFAULT_MAX_DISTANCE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl MarchSettings {
    /// Replaces unusable values with defaults so marching always terminates.
    pub fn sanitized(self) -> Self {
        let mut settings = self;
        if !settings.epsilon.is_finite() || settings.epsilon <= 0.0 {
            tracing::warn!(
                "epsilon {} is not positive, using {DEFAULT_EPSILON}",
                settings.epsilon
            );
            settings.epsilon = DEFAULT_EPSILON;
        }
        if !settings.max_distance.is_finite() || settings.max_distance <= 0.0 {
            tracing::warn!(
                "max march distance {} is not positive, using {DEFAULT_MAX_DISTANCE}",
                settings.max_distance
            );
            settings.max_distance = DEFAULT_MAX_DISTANCE;
        }
        if settings.max_steps == 0 {
            tracing::warn!("max march steps is zero, using {DEFAULT_MAX_STEPS}");
            settings.max_steps = DEFAULT_MAX_STEPS;
        }
        settings
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingParams {
    pub ambient_color: Vec3,
    pub light_color: Vec3,
    /// Points from the light toward the scene.
    pub light_direction: Vec3,
    pub shadows_enabled: bool,
    pub shadow_strength: f32,
    pub ao_strength: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::new(0.5, 0.5, 0.5),
            light_color: Vec3::new(1.0, 1.0, 1.0),
            light_direction: Vec3::new(-0.4, -1.0, -0.3).normalize(),
            shadows_enabled: true,
            shadow_strength: 0.75,
            ao_strength: 1.0,
        }
    }
}

impl LightingParams {
    pub fn sanitized(self) -> Self {
        let mut params = self;
        params.light_direction = match params.light_direction.try_normalize() {
            Some(direction) => direction,
            None => {
                tracing::warn!(
                    "light direction {:?} has no length, lighting straight down",
                    params.light_direction
                );
                Vec3::new(0.0, -1.0, 0.0)
            }
        };
        params.shadow_strength = if params.shadow_strength.is_finite() {
            params.shadow_strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        params.ao_strength = if params.ao_strength.is_finite() {
            params.ao_strength.max(0.0)
        } else {
            0.0
        };
        params
    }
}

/// Everything one frame's dispatch reads. Passed by value into the kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub march: MarchSettings,
    pub lighting: LightingParams,
    pub camera: CameraState,
    pub width: u32,
    pub height: u32,
    /// Seconds since the host started, monotonic.
    pub time: f32,
}

impl FrameParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            march: MarchSettings::default(),
            lighting: LightingParams::default(),
            camera: CameraState::default(),
            width,
            height,
            time: 0.0,
        }
    }

    pub fn sanitized(self) -> Self {
        Self {
            march: self.march.sanitized(),
            lighting: self.lighting.sanitized(),
            width: self.width.max(1),
            height: self.height.max(1),
            ..self
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}
