use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::field::DistanceField;
use crate::math::Vec3;

use super::frustum::{Frustum, Viewport};
use super::lighting::{ambient_occlusion, shadow, LIT};
use super::march::march;
use super::settings::FrameParams;
use super::shade::shade;

/// Colour of one pixel at relative screen position `(u, v)`.
pub fn render_pixel(
    frustum: &Frustum,
    u: f32,
    v: f32,
    field: &dyn DistanceField,
    params: &FrameParams,
) -> Vec3 {
    let settings = params.march;
    let lighting = &params.lighting;
    let ray = frustum.ray(u, v);

    if field.evaluate(ray.origin) < settings.epsilon {
        return Vec3::ZERO;
    }

    let info = march(ray, field, settings);
    if !info.hit {
        return lighting.ambient_color;
    }

    let visibility = if lighting.shadows_enabled {
        shadow(
            info.position + (info.normal * (2.0 * settings.epsilon)),
            lighting.light_direction,
            field,
            settings.epsilon,
            settings.max_distance,
        )
    } else {
        LIT
    };
    let ao = ambient_occlusion(info.position, info.normal, field, lighting.ao_strength);

    shade(
        &info,
        ray.origin,
        visibility,
        ao,
        lighting,
        settings.max_distance,
    )
}

/// Renders a full frame, one logical task per pixel, rows split across threads.
///
/// `params` is expected to be sanitized already.
pub fn render_frame(field: &dyn DistanceField, params: &FrameParams) -> RgbImage {
    let width = params.width.max(1);
    let height = params.height.max(1);
    let frustum = Frustum::new(
        &params.camera,
        params.aspect_ratio(),
        Viewport::new(width, height),
    );

    let row_len = width as usize;
    let mut color_buffer = vec![Vec3::ZERO; row_len * height as usize];

    color_buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, slots)| {
            // Image rows run top-down, screen space bottom-up.
            let y = height - 1 - row as u32;
            for (x, slot) in slots.iter_mut().enumerate() {
                let (u, v) = frustum.pixel_uv(x as u32, y);
                *slot = render_pixel(&frustum, u, v, field, params);
            }
        });

    let mut image = RgbImage::new(width, height);
    for (index, color) in color_buffer.iter().enumerate() {
        let x = (index % row_len) as u32;
        let y = (index / row_len) as u32;
        image.put_pixel(x, y, to_rgb(*color));
    }
    image
}

pub fn to_rgb(color: Vec3) -> Rgb<u8> {
    let c = color.clamp01();
    Rgb([
        (c.x * 255.0).round() as u8,
        (c.y * 255.0).round() as u8,
        (c.z * 255.0).round() as u8,
    ])
}
