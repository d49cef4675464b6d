use crate::field::DistanceField;
use crate::math::Vec3;

use super::settings::SHADOW_MAX_STEPS;

const AO_SAMPLES: u32 = 5;
const AO_DECAY: f32 = 0.75;

/// Light visibility returned by [`shadow`].
pub const IN_SHADOW: f32 = 0.0;
pub const LIT: f32 = 1.0;

/// Central-difference gradient of `field` at `p`, six evaluations.
///
/// Falls back to `+Y` where the gradient vanishes.
pub fn estimate_normal(p: Vec3, field: &dyn DistanceField, epsilon: f32) -> Vec3 {
    estimate_normal_facing(p, field, epsilon, Vec3::Y)
}

pub fn estimate_normal_facing(
    p: Vec3,
    field: &dyn DistanceField,
    epsilon: f32,
    fallback: Vec3,
) -> Vec3 {
    let e = epsilon;
    let dx =
        field.evaluate(p + Vec3::new(e, 0.0, 0.0)) - field.evaluate(p - Vec3::new(e, 0.0, 0.0));
    let dy =
        field.evaluate(p + Vec3::new(0.0, e, 0.0)) - field.evaluate(p - Vec3::new(0.0, e, 0.0));
    let dz =
        field.evaluate(p + Vec3::new(0.0, 0.0, e)) - field.evaluate(p - Vec3::new(0.0, 0.0, e));
    Vec3::new(dx, dy, dz)
        .try_normalize()
        .unwrap_or_else(|| fallback.try_normalize().unwrap_or(Vec3::Y))
}

/// Hard shadow test: `LIT` if nothing lies between `origin` and the light.
///
/// `origin` should already be lifted off the surface. `light_direction`
/// points from the light into the scene.
pub fn shadow(
    origin: Vec3,
    light_direction: Vec3,
    field: &dyn DistanceField,
    epsilon: f32,
    max_distance: f32,
) -> f32 {
    let direction = -light_direction;
    let mut t = 0.0;

    for _ in 0..SHADOW_MAX_STEPS {
        let dist = field.evaluate(origin + (direction * t));
        if dist < epsilon {
            return IN_SHADOW;
        }
        t += dist;
        if t >= max_distance {
            return LIT;
        }
    }

    LIT
}

/// Fixed five-tap occlusion estimate along the normal; 1 means unoccluded.
pub fn ambient_occlusion(p: Vec3, normal: Vec3, field: &dyn DistanceField, strength: f32) -> f32 {
    let mut occlusion = 0.0;
    let mut weight = 1.0;

    for i in 0..AO_SAMPLES {
        let radius = 0.01 + (0.02 * (i * i) as f32);
        let dist = field.evaluate(p + (normal * radius));
        occlusion += (radius - dist).clamp(0.0, 1.0) * weight;
        weight *= AO_DECAY;
    }

    1.0 - (strength * occlusion).clamp(0.0, 1.0)
}
