use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::primitives::{op_union, sd_box, sd_menger, sd_plane, sd_sphere};
use super::{AnalyticField, DistanceField, VolumetricField};
use crate::math::Vec3;

pub const SPHERE: &str = "sphere";
pub const SPHERE_ON_PLANE: &str = "sphere_on_plane";
pub const BOX_ON_PLANE: &str = "box_on_plane";
pub const MENGER_ON_PLANE: &str = "menger_on_plane";

const FLOOR_Y: f32 = -1.0;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown scene identifier: {0}")]
    UnknownPreset(String),
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the active distance field comes from.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SceneSource {
    Preset(String),
    Volume(String),
}

impl SceneSource {
    pub fn read(path: &Path) -> Result<Self, SceneError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SceneError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Volumes that fail to load come back empty rather than as an error.
    pub fn build(&self, model_directory: &Path) -> Result<Arc<dyn DistanceField>, SceneError> {
        match self {
            Self::Preset(id) => build_scene(id),
            Self::Volume(file) => Ok(Arc::new(VolumetricField::load_or_empty(
                model_directory.join(file),
            ))),
        }
    }
}

pub fn build_scene(scene_id: &str) -> Result<Arc<dyn DistanceField>, SceneError> {
    let id = scene_id.trim();
    let field = if id.eq_ignore_ascii_case(SPHERE) {
        AnalyticField::new(SPHERE, |p| sd_sphere(p, 1.0))
    } else if id.eq_ignore_ascii_case(SPHERE_ON_PLANE) {
        AnalyticField::new(SPHERE_ON_PLANE, |p| {
            op_union(sd_sphere(p, 1.0), sd_plane(p, Vec3::Y, FLOOR_Y))
        })
    } else if id.eq_ignore_ascii_case(BOX_ON_PLANE) {
        AnalyticField::new(BOX_ON_PLANE, |p| {
            op_union(
                sd_box(p - Vec3::new(0.0, -0.25, 0.0), Vec3::new(0.75, 0.75, 0.75)),
                sd_plane(p, Vec3::Y, FLOOR_Y),
            )
        })
    } else if id.eq_ignore_ascii_case(MENGER_ON_PLANE) {
        let scale = 0.9;
        let center = Vec3::new(0.0, FLOOR_Y + scale, 0.0);
        AnalyticField::new(MENGER_ON_PLANE, move |p| {
            let local = (p - center) / scale;
            op_union(sd_menger(local, 4) * scale, sd_plane(p, Vec3::Y, FLOOR_Y))
        })
    } else {
        return Err(SceneError::UnknownPreset(scene_id.to_owned()));
    };

    Ok(Arc::new(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_case_insensitively() {
        for id in [SPHERE, SPHERE_ON_PLANE, BOX_ON_PLANE, MENGER_ON_PLANE] {
            let field = build_scene(&id.to_ascii_uppercase()).expect("known preset");
            assert_eq!(field.name(), id);
        }
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(matches!(
            build_scene("teapot"),
            Err(SceneError::UnknownPreset(id)) if id == "teapot"
        ));
    }

    #[test]
    fn floor_sits_below_preset_geometry() {
        let field = build_scene(SPHERE_ON_PLANE).expect("known preset");
        assert!(field.evaluate(Vec3::new(5.0, FLOOR_Y, 5.0)).abs() < 1e-6);
        assert!(field.evaluate(Vec3::new(0.0, 1.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn scene_source_parses_both_variants() {
        let preset: SceneSource = serde_json::from_str(r#"{"preset": "sphere"}"#).unwrap();
        assert_eq!(preset, SceneSource::Preset("sphere".into()));
        let volume: SceneSource = serde_json::from_str(r#"{"volume": "bunny.txt"}"#).unwrap();
        assert_eq!(volume, SceneSource::Volume("bunny.txt".into()));
    }

    #[test]
    fn missing_volume_builds_an_empty_field() {
        let dir = tempfile::tempdir().unwrap();
        let field = SceneSource::Volume("absent.txt".into())
            .build(dir.path())
            .expect("volume sources never fail to build");
        assert!(field.is_empty());
    }
}
