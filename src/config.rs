use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::field::presets::SceneSource;
use crate::math::Vec3;
use crate::render::settings::{DEFAULT_EPSILON, DEFAULT_MAX_DISTANCE, DEFAULT_MAX_STEPS};
use crate::render::{CameraState, FrameParams, LightingParams, MarchSettings};

const FRAME_PLACEHOLDER: &str = "{frame}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrameConfig {
    pub width: u32,
    pub height: u32,
    pub output_path: String,
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
    #[serde(default = "default_frame_interval")]
    pub frame_interval: f32,
    pub scene: Option<SceneSource>,
    pub scene_file: Option<String>,
    #[serde(default)]
    pub watch: bool,
    #[serde(default = "default_model_directory")]
    pub model_directory: String,
    #[serde(default = "default_camera_position")]
    pub camera_position: [f32; 3],
    #[serde(default)]
    pub camera_target: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov_deg: f32,
    pub orbit_radius: Option<f32>,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    #[serde(default = "default_max_march_distance")]
    pub max_march_distance: f32,
    #[serde(default = "default_max_march_steps")]
    pub max_march_steps: u32,
    #[serde(default = "default_true")]
    pub shadows_enabled: bool,
    pub shadow_strength: Option<f32>,
    pub ao_strength: Option<f32>,
    pub ambient_color: Option<[f32; 3]>,
    pub light_color: Option<[f32; 3]>,
    pub light_direction: Option<[f32; 3]>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBatchConfig {
    pub frames: Vec<RenderFrameConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IncomingConfig {
    Single(RenderFrameConfig),
    Batch(RenderBatchConfig),
}

impl RenderFrameConfig {
    pub fn frame_params(&self, time: f32) -> FrameParams {
        let defaults = LightingParams::default();
        let mut camera = CameraState {
            position: Vec3::from_array(self.camera_position),
            target: Vec3::from_array(self.camera_target),
            up: Vec3::Y,
            vertical_fov_deg: self.fov_deg,
        };
        if let Some(radius) = self.orbit_radius {
            camera = camera.orbit(radius, time);
        }

        FrameParams {
            march: MarchSettings {
                epsilon: self.epsilon,
                max_distance: self.max_march_distance,
                max_steps: self.max_march_steps,
            },
            lighting: LightingParams {
                ambient_color: self.ambient_color.map_or(defaults.ambient_color, Vec3::from_array),
                light_color: self.light_color.map_or(defaults.light_color, Vec3::from_array),
                light_direction: self
                    .light_direction
                    .map_or(defaults.light_direction, Vec3::from_array),
                shadows_enabled: self.shadows_enabled,
                shadow_strength: self.shadow_strength.unwrap_or(defaults.shadow_strength),
                ao_strength: self.ao_strength.unwrap_or(defaults.ao_strength),
            },
            camera,
            width: self.width,
            height: self.height,
            time,
        }
    }

    pub fn model_directory(&self) -> &Path {
        Path::new(&self.model_directory)
    }

    /// Inline scene if given, otherwise the contents of `sceneFile`.
    pub fn scene_source(&self) -> Result<SceneSource, Box<dyn std::error::Error>> {
        if let Some(scene) = &self.scene {
            return Ok(scene.clone());
        }
        let path = self
            .scene_file
            .as_deref()
            .ok_or("either scene or sceneFile must be set")?;
        Ok(SceneSource::read(Path::new(path))?)
    }

    pub fn output_path_for(&self, frame: u32) -> PathBuf {
        if self.output_path.contains(FRAME_PLACEHOLDER) {
            PathBuf::from(
                self.output_path
                    .replace(FRAME_PLACEHOLDER, &format!("{frame:04}")),
            )
        } else {
            PathBuf::from(&self.output_path)
        }
    }
}

const fn default_frame_count() -> u32 {
    1
}

fn default_frame_interval() -> f32 {
    1.0 / 60.0
}

fn default_model_directory() -> String {
    String::from("Resources/Models")
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 4.0, 6.0]
}

fn default_fov() -> f32 {
    45.0
}

fn default_epsilon() -> f32 {
    DEFAULT_EPSILON
}

fn default_max_march_distance() -> f32 {
    DEFAULT_MAX_DISTANCE
}

const fn default_max_march_steps() -> u32 {
    DEFAULT_MAX_STEPS
}

const fn default_true() -> bool {
    true
}

/// Rejects configs the host cannot act on. Out-of-range march and lighting
/// values are not errors; they are clamped when the frame is published.
pub fn validate_config(config: &RenderFrameConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.width == 0 || config.height == 0 {
        return Err("width and height must be positive".into());
    }

    let output_path = config.output_path_for(0);
    let output_parent = output_path
        .parent()
        .ok_or("outputPath must include a parent directory")?;
    if !output_parent.as_os_str().is_empty() && !output_parent.exists() {
        return Err(format!(
            "output directory does not exist: {}",
            output_parent.display()
        )
        .into());
    }

    if config.frame_count == 0 {
        return Err("frameCount must be at least 1".into());
    }
    if config.frame_count > 1 && !config.output_path.contains(FRAME_PLACEHOLDER) {
        return Err(format!(
            "outputPath must contain {FRAME_PLACEHOLDER} when rendering several frames"
        )
        .into());
    }
    if !config.frame_interval.is_finite() || config.frame_interval < 0.0 {
        return Err("frameInterval must be a finite, non-negative number of seconds".into());
    }

    if config.scene.is_none() && config.scene_file.is_none() {
        return Err("either scene or sceneFile must be set".into());
    }
    if config.watch && config.scene_file.is_none() {
        return Err("watch requires sceneFile".into());
    }

    if !config.fov_deg.is_finite() || config.fov_deg <= 0.0 || config.fov_deg >= 180.0 {
        return Err("fovDeg must lie strictly between 0 and 180".into());
    }
    if !is_finite_vec3(config.camera_position) || !is_finite_vec3(config.camera_target) {
        return Err("camera vectors must contain finite values".into());
    }
    if config.orbit_radius.is_none() {
        let position = Vec3::from_array(config.camera_position);
        let target = Vec3::from_array(config.camera_target);
        if (position - target).length() < 0.0001 {
            return Err("cameraPosition must differ from cameraTarget".into());
        }
    }

    for (name, value) in [
        ("ambientColor", config.ambient_color),
        ("lightColor", config.light_color),
        ("lightDirection", config.light_direction),
    ] {
        if value.is_some_and(|v| !is_finite_vec3(v)) {
            return Err(format!("{name} must contain finite values").into());
        }
    }

    Ok(())
}

fn is_finite_vec3(value: [f32; 3]) -> bool {
    value[0].is_finite() && value[1].is_finite() && value[2].is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RenderFrameConfig {
        match serde_json::from_str::<IncomingConfig>(json).expect("valid json") {
            IncomingConfig::Single(frame) => frame,
            IncomingConfig::Batch(_) => panic!("expected a single frame"),
        }
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(
            r#"{"width": 64, "height": 32, "outputPath": "out.png", "scene": {"preset": "sphere"}}"#,
        );
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.frame_count, 1);
        assert_eq!(config.model_directory(), Path::new("Resources/Models"));

        let params = config.frame_params(0.0);
        assert_eq!(params.march, MarchSettings::default());
        assert_eq!(params.camera.position, Vec3::new(0.0, 4.0, 6.0));
        assert_eq!(params.lighting, LightingParams::default());
        assert_eq!(params.aspect_ratio(), 2.0);
    }

    #[test]
    fn batch_configs_parse() {
        let incoming: IncomingConfig = serde_json::from_str(
            r#"{"frames": [
                {"width": 4, "height": 4, "outputPath": "a.png", "scene": {"preset": "sphere"}},
                {"width": 4, "height": 4, "outputPath": "b.png", "scene": {"volume": "bunny.txt"}}
            ]}"#,
        )
        .unwrap();
        match incoming {
            IncomingConfig::Batch(batch) => assert_eq!(batch.frames.len(), 2),
            IncomingConfig::Single(_) => panic!("expected a batch"),
        }
    }

    #[test]
    fn non_positive_epsilon_is_accepted_and_clamped_later() {
        let config = parse(
            r#"{"width": 4, "height": 4, "outputPath": "out.png", "scene": {"preset": "sphere"},
                "epsilon": -1.0, "maxMarchSteps": 0}"#,
        );
        assert!(validate_config(&config).is_ok());
        let params = config.frame_params(0.0).sanitized();
        assert_eq!(params.march.epsilon, DEFAULT_EPSILON);
        assert_eq!(params.march.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn rejects_unusable_configs() {
        let base = r#""outputPath": "out.png", "scene": {"preset": "sphere"}"#;
        for json in [
            format!(r#"{{"width": 0, "height": 4, {base}}}"#),
            format!(r#"{{"width": 4, "height": 4, {base}, "frameCount": 0}}"#),
            format!(r#"{{"width": 4, "height": 4, {base}, "frameCount": 3}}"#),
            format!(r#"{{"width": 4, "height": 4, {base}, "cameraPosition": [0, 0, 0]}}"#),
            format!(r#"{{"width": 4, "height": 4, {base}, "fovDeg": 180}}"#),
            format!(r#"{{"width": 4, "height": 4, {base}, "watch": true}}"#),
            r#"{"width": 4, "height": 4, "outputPath": "out.png"}"#.to_owned(),
            r#"{"width": 4, "height": 4, "outputPath": "/no/such/dir/out.png", "scene": {"preset": "sphere"}}"#.to_owned(),
        ] {
            assert!(validate_config(&parse(&json)).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn orbit_moves_camera_over_time() {
        let config = parse(
            r#"{"width": 4, "height": 4, "outputPath": "f{frame}.png", "frameCount": 2,
                "scene": {"preset": "sphere"}, "orbitRadius": 5.0, "cameraPosition": [0, 4, 0]}"#,
        );
        assert!(validate_config(&config).is_ok());
        let start = config.frame_params(0.0).camera.position;
        assert!(start.distance(Vec3::new(0.0, 4.0, 5.0)) < 1e-5);
        assert_ne!(config.frame_params(1.0).camera.position, start);
    }

    #[test]
    fn frame_placeholder_is_numbered() {
        let config = parse(
            r#"{"width": 4, "height": 4, "outputPath": "renders/frame_{frame}.png", "scene": {"preset": "sphere"}}"#,
        );
        assert_eq!(
            config.output_path_for(7),
            PathBuf::from("renders/frame_0007.png")
        );
    }
}
