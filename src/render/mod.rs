pub mod cpu;
pub mod frustum;
pub mod lighting;
pub mod march;
pub mod settings;
pub mod shade;

pub use cpu::{render_frame, render_pixel};
pub use frustum::{CameraState, Frustum, Viewport};
pub use lighting::{ambient_occlusion, estimate_normal, shadow};
pub use march::{march, MarchInfo};
pub use settings::{FrameParams, LightingParams, MarchSettings};
pub use shade::shade;
