use crate::math::Vec3;

use super::march::MarchInfo;
use super::settings::LightingParams;

/// Combines direct light, shadow, ambient fill, occlusion and distance fog.
///
/// `visibility` is the [`shadow`](super::lighting::shadow) result, so `0`
/// darkens by the full shadow strength and `1` leaves the light untouched.
pub fn shade(
    info: &MarchInfo,
    ray_origin: Vec3,
    visibility: f32,
    ao: f32,
    lighting: &LightingParams,
    max_distance: f32,
) -> Vec3 {
    if !info.hit {
        return lighting.ambient_color;
    }

    let lambert = info.normal.dot(-lighting.light_direction).max(0.0);
    let mut color = lighting.light_color * lambert;

    let shadow_amount = 1.0 - visibility.clamp(0.0, 1.0);
    color -= color * (shadow_amount * lighting.shadow_strength);
    color += lighting.ambient_color * (Vec3::splat(1.0) - color);
    color = color * ao;

    let fog = (ray_origin.distance(info.position) / max_distance).clamp(0.0, 1.0);
    color.lerp(lighting.ambient_color, fog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lighting() -> LightingParams {
        LightingParams {
            ambient_color: Vec3::new(0.2, 0.3, 0.4),
            light_color: Vec3::new(1.0, 0.8, 0.6),
            light_direction: -Vec3::Y,
            shadows_enabled: true,
            shadow_strength: 0.5,
            ao_strength: 1.0,
        }
    }

    fn hit_at(position: Vec3, normal: Vec3) -> MarchInfo {
        MarchInfo {
            hit: true,
            depth: position.length(),
            min_distance: 0.0,
            position,
            normal,
            steps: 3,
        }
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.distance(b) < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn miss_returns_ambient() {
        let info = MarchInfo {
            hit: false,
            depth: 100.0,
            min_distance: 0.5,
            position: Vec3::new(0.0, 0.0, -100.0),
            normal: Vec3::ZERO,
            steps: 9,
        };
        let params = lighting();
        assert_eq!(shade(&info, Vec3::ZERO, 1.0, 1.0, &params, 100.0), params.ambient_color);
    }

    #[test]
    fn lit_surface_facing_light_blends_ambient_into_complement() {
        let info = hit_at(Vec3::ZERO, Vec3::Y);
        let params = lighting();
        let color = shade(&info, Vec3::ZERO, 1.0, 1.0, &params, 100.0);
        // diffuse = light; then ambient fills 1 - diffuse per channel.
        let expected = Vec3::new(1.0, 0.8 + 0.3 * 0.2, 0.6 + 0.4 * 0.4);
        assert_close(color, expected);
    }

    #[test]
    fn shadow_only_darkens() {
        let info = hit_at(Vec3::ZERO, Vec3::Y);
        let params = lighting();
        let lit = shade(&info, Vec3::ZERO, 1.0, 1.0, &params, 100.0);
        let shadowed = shade(&info, Vec3::ZERO, 0.0, 1.0, &params, 100.0);
        assert!(shadowed.x < lit.x && shadowed.y < lit.y && shadowed.z < lit.z);

        let halved = Vec3::new(0.5, 0.4, 0.3);
        let expected = halved + params.ambient_color * (Vec3::splat(1.0) - halved);
        assert_close(shadowed, expected);
    }

    #[test]
    fn back_facing_surface_gets_only_ambient() {
        let info = hit_at(Vec3::ZERO, -Vec3::Y);
        let params = lighting();
        assert_close(
            shade(&info, Vec3::ZERO, 1.0, 1.0, &params, 100.0),
            params.ambient_color,
        );
    }

    #[test]
    fn occlusion_scales_the_result() {
        let info = hit_at(Vec3::ZERO, Vec3::Y);
        let params = lighting();
        let full = shade(&info, Vec3::ZERO, 1.0, 1.0, &params, 100.0);
        let half = shade(&info, Vec3::ZERO, 1.0, 0.5, &params, 100.0);
        assert_close(half, full * 0.5);
    }

    #[test]
    fn fog_fades_toward_ambient_with_distance() {
        let params = lighting();
        let near = shade(&hit_at(Vec3::ZERO, Vec3::Y), Vec3::ZERO, 1.0, 1.0, &params, 10.0);
        let far_info = hit_at(Vec3::new(0.0, 0.0, -5.0), Vec3::Y);
        let far = shade(&far_info, Vec3::ZERO, 1.0, 1.0, &params, 10.0);
        assert_close(far, near.lerp(params.ambient_color, 0.5));

        let edge_info = hit_at(Vec3::new(0.0, 0.0, -10.0), Vec3::Y);
        assert_close(
            shade(&edge_info, Vec3::ZERO, 1.0, 1.0, &params, 10.0),
            params.ambient_color,
        );
    }
}
