use crate::math::Vec3;

pub fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

pub fn sd_box(p: Vec3, half_extents: Vec3) -> f32 {
    let q = p.abs() - half_extents;
    let outside = q.max(Vec3::splat(0.0));
    outside.length() + q.max_component().min(0.0)
}

/// Plane through `height` along `normal`, which must be unit length.
pub fn sd_plane(p: Vec3, normal: Vec3, height: f32) -> f32 {
    p.dot(normal) - height
}

pub fn sd_menger(p: Vec3, iterations: u32) -> f32 {
    let mut distance = sd_box(p, Vec3::splat(1.0));
    let mut scale = 1.0;

    for _ in 0..iterations {
        let cell = (p * scale).rem_euclid(2.0) - Vec3::splat(1.0);
        scale *= 3.0;
        let r = (Vec3::splat(1.0) - (cell.abs() * 3.0)).abs();

        let da = r.x.max(r.y);
        let db = r.y.max(r.z);
        let dc = r.x.max(r.z);
        let carved = (da.min(db).min(dc) - 1.0) / scale;
        distance = distance.max(carved);
    }

    distance
}

pub fn op_union(a: f32, b: f32) -> f32 {
    a.min(b)
}
