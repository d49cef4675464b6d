use crate::math::{Ray, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub vertical_fov_deg: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 4.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            vertical_fov_deg: 45.0,
        }
    }
}

impl CameraState {
    /// Circles the camera around the vertical axis, half a radian per second.
    pub fn orbit(self, radius: f32, time: f32) -> Self {
        let angle = time * 0.5;
        Self {
            position: Vec3::new(radius * angle.sin(), self.position.y, radius * angle.cos()),
            ..self
        }
    }
}

/// Pixel rectangle the frame is rendered into, `y` counted from the bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }
}

/// The four rays through the corners of the near plane, rebuilt once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub position: Vec3,
    pub top_left: Vec3,
    pub top_right: Vec3,
    pub bottom_left: Vec3,
    pub bottom_right: Vec3,
    pub viewport: Viewport,
}

impl Frustum {
    pub fn new(camera: &CameraState, aspect_ratio: f32, viewport: Viewport) -> Self {
        let forward = (camera.target - camera.position)
            .try_normalize()
            .unwrap_or(-Vec3::Z);
        let right = forward
            .cross(camera.up)
            .try_normalize()
            .or_else(|| forward.cross(Vec3::Z).try_normalize())
            .unwrap_or(Vec3::X);
        let up = right.cross(forward);

        let half_height = (camera.vertical_fov_deg.to_radians() * 0.5).tan();
        let half_width = half_height * aspect_ratio;
        let center = camera.position + forward;
        let horizontal = right * half_width;
        let vertical = up * half_height;

        Self {
            position: camera.position,
            top_left: center - horizontal + vertical,
            top_right: center + horizontal + vertical,
            bottom_left: center - horizontal - vertical,
            bottom_right: center + horizontal - vertical,
            viewport,
        }
    }

    /// Ray through `(u, v)` on the near plane; `(0, 0)` is bottom left.
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        let bottom = self.bottom_left.lerp(self.bottom_right, u);
        let top = self.top_left.lerp(self.top_right, u);
        let point = bottom.lerp(top, v);
        Ray {
            origin: point,
            direction: (point - self.position).normalize(),
        }
    }

    /// Relative screen position of the centre of pixel `(x, y)`, `y` from the bottom.
    pub fn pixel_uv(&self, x: u32, y: u32) -> (f32, f32) {
        let u = ((x as f32 + 0.5) - self.viewport.x) / self.viewport.width;
        let v = ((y as f32 + 0.5) - self.viewport.y) / self.viewport.height;
        (u, v)
    }
}
