use crate::field::DistanceField;
use crate::math::{Ray, Vec3};

use super::lighting::estimate_normal_facing;
use super::settings::MarchSettings;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchInfo {
    pub hit: bool,
    /// Distance travelled along the ray, never negative.
    pub depth: f32,
    /// Smallest field value seen at any step.
    pub min_distance: f32,
    pub position: Vec3,
    /// Surface normal on a hit, zero otherwise.
    pub normal: Vec3,
    pub steps: u32,
}

/// Sphere traces `ray` through `field`.
///
/// Escaping past `max_distance` and running out of steps are both reported
/// as a plain miss. When a step lands inside the surface the depth is pulled
/// back by twice the (negative) sample before the hit is resolved.
pub fn march(ray: Ray, field: &dyn DistanceField, settings: MarchSettings) -> MarchInfo {
    let mut depth = 0.0_f32;
    let mut min_distance = f32::INFINITY;
    let mut steps = 0;

    while steps < settings.max_steps {
        steps += 1;
        let dist = field.evaluate(ray.at(depth));
        min_distance = min_distance.min(dist);

        if dist < settings.epsilon {
            if dist < 0.0 {
                depth = (depth + (dist * 2.0)).max(0.0);
            }
            let position = ray.at(depth);
            return MarchInfo {
                hit: true,
                depth,
                min_distance,
                position,
                normal: estimate_normal_facing(position, field, settings.epsilon, -ray.direction),
                steps,
            };
        }

        depth += dist;
        if depth >= settings.max_distance {
            if !depth.is_finite() {
                depth = settings.max_distance;
            }
            break;
        }
    }

    MarchInfo {
        hit: false,
        depth,
        min_distance,
        position: ray.at(depth),
        normal: Vec3::ZERO,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::primitives::sd_sphere;

    const SETTINGS: MarchSettings = MarchSettings {
        epsilon: 0.001,
        max_distance: 50.0,
        max_steps: 128,
    };

    fn sphere(p: Vec3) -> f32 {
        sd_sphere(p, 1.0)
    }

    #[test]
    fn ray_at_sphere_centre_hits_front_surface() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: -Vec3::Z,
        };
        let info = march(ray, &sphere, SETTINGS);
        assert!(info.hit);
        assert!(info.steps <= SETTINGS.max_steps);
        assert!(info.position.distance(Vec3::new(0.0, 0.0, 1.0)) < SETTINGS.epsilon);
        assert!((info.depth - 4.0).abs() < SETTINGS.epsilon);
        assert!(info.normal.distance(Vec3::Z) < 1e-3);
    }

    #[test]
    fn ray_pointing_away_escapes() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        let info = march(ray, &sphere, SETTINGS);
        assert!(!info.hit);
        assert!(info.depth >= SETTINGS.max_distance);
        assert_eq!(info.normal, Vec3::ZERO);
        // Distance grows one-for-one here, so the first step already covers
        // four units and the march ends well before the step budget.
        assert!(info.steps < 10);
        assert!((info.min_distance - 4.0).abs() < 1e-6);
    }

    #[test]
    fn exhausted_step_budget_reports_a_miss() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        // Constant tiny steps never reach the surface or the distance cap.
        let field = |_: Vec3| 0.01_f32;
        let info = march(
            ray,
            &field,
            MarchSettings {
                max_steps: 16,
                ..SETTINGS
            },
        );
        assert!(!info.hit);
        assert_eq!(info.steps, 16);
        assert!((info.depth - 0.16).abs() < 1e-5);
    }

    #[test]
    fn grazing_ray_tracks_minimum_distance() {
        let ray = Ray {
            origin: Vec3::new(-5.0, 1.5, 0.0),
            direction: Vec3::X,
        };
        let info = march(ray, &sphere, SETTINGS);
        assert!(!info.hit);
        assert!((info.min_distance - 0.5).abs() < 1e-2);
    }

    #[test]
    fn negative_sample_pulls_depth_back_twice() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        // Overshooting field: large first step, then a negative reading.
        let field = |p: Vec3| if p.x < 1.0 { 2.0_f32 } else { -0.25 };
        let info = march(ray, &field, SETTINGS);
        assert!(info.hit);
        assert_eq!(info.steps, 2);
        assert!((info.depth - 1.5).abs() < 1e-6);
        assert!((info.min_distance + 0.25).abs() < 1e-6);
        assert!(info.position.distance(Vec3::new(1.5, 0.0, 0.0)) < 1e-6);
    }

    #[test]
    fn empty_field_misses_immediately() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::Y,
        };
        let info = march(ray, &crate::field::VolumetricField::empty(), SETTINGS);
        assert!(!info.hit);
        assert_eq!(info.steps, 1);
        assert_eq!(info.depth, SETTINGS.max_distance);
        assert!(info.position.is_finite());
    }
}
