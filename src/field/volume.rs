//! Sampled distance fields loaded from flat text grids.
//!
//! A model file starts with the voxel size, followed by one sample per
//! non-blank line. Samples are ordered X fastest, then Y, then Z, and cover
//! the cube `[-1, 1]^3` with `2 / voxel_size` samples per axis. Sample values
//! are stored in voxel units and scaled to world units on evaluation.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::DistanceField;
use crate::math::Vec3;

const GRID_EXTENT: f32 = 2.0;
const RESOLUTION_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("failed to open model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model file has no voxel size")]
    MissingVoxelSize,
    #[error("voxel size must be positive and divide the unit cube evenly, got {0}")]
    InvalidVoxelSize(f32),
    #[error("line {line}: '{text}' is not a number")]
    MalformedSample { line: usize, text: String },
    #[error("expected {expected} samples for the voxel size, found {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },
}

#[derive(Clone, Debug, Default)]
pub struct VolumetricField {
    name: String,
    voxel_size: f32,
    resolution: usize,
    samples: Vec<f32>,
}

impl VolumetricField {
    /// A field with no samples. Every query reports an infinitely distant surface.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_samples(voxel_size: f32, samples: Vec<f32>) -> Result<Self, VolumeError> {
        let resolution = resolution_for(voxel_size)?;
        let expected = resolution
            .checked_pow(3)
            .ok_or(VolumeError::InvalidVoxelSize(voxel_size))?;
        if samples.len() != expected {
            return Err(VolumeError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            name: String::from("volume"),
            voxel_size,
            resolution,
            samples,
        })
    }

    pub fn parse(source: &str) -> Result<Self, VolumeError> {
        let mut lines = source.lines().enumerate();
        let mut samples = Vec::new();

        let voxel_size = loop {
            let Some((index, line)) = lines.next() else {
                return Err(VolumeError::MissingVoxelSize);
            };
            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };
            let voxel_size = parse_number(first, index)?;
            for token in tokens {
                samples.push(parse_number(token, index)?);
            }
            break voxel_size;
        };

        for (index, line) in lines {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            samples.push(parse_number(text, index)?);
        }

        Self::from_samples(voxel_size, samples)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, VolumeError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| VolumeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut field = Self::parse(&source)?;
        field.name = path.display().to_string();
        tracing::info!(
            path = %path.display(),
            voxel_size = field.voxel_size,
            resolution = field.resolution,
            "loaded volumetric model"
        );
        Ok(field)
    }

    /// Loads a model, logging failures and falling back to an empty field.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(field) => field,
            Err(error) => {
                tracing::error!(path = %path.as_ref().display(), "{error}");
                Self::empty()
            }
        }
    }

    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    fn sample(&self, x: usize, y: usize, z: usize) -> f32 {
        let n = self.resolution;
        self.samples[x + (n * (y + (n * z)))]
    }
}

impl DistanceField for VolumetricField {
    fn evaluate(&self, p: Vec3) -> f32 {
        if self.samples.is_empty() {
            return f32::INFINITY;
        }

        let last = (self.resolution - 1) as f32;
        // Texel centres sit half a voxel in from each face of the cube.
        let to_texel = |c: f32| (((c + 1.0) / self.voxel_size) - 0.5).clamp(0.0, last);
        let (tx, ty, tz) = (to_texel(p.x), to_texel(p.y), to_texel(p.z));

        let (x0, y0, z0) = (tx.floor() as usize, ty.floor() as usize, tz.floor() as usize);
        let x1 = (x0 + 1).min(self.resolution - 1);
        let y1 = (y0 + 1).min(self.resolution - 1);
        let z1 = (z0 + 1).min(self.resolution - 1);
        let (fx, fy, fz) = (tx - x0 as f32, ty - y0 as f32, tz - z0 as f32);

        let lerp = crate::math::mix;
        let c00 = lerp(self.sample(x0, y0, z0), self.sample(x1, y0, z0), fx);
        let c10 = lerp(self.sample(x0, y1, z0), self.sample(x1, y1, z0), fx);
        let c01 = lerp(self.sample(x0, y0, z1), self.sample(x1, y0, z1), fx);
        let c11 = lerp(self.sample(x0, y1, z1), self.sample(x1, y1, z1), fx);
        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);

        lerp(c0, c1, fz) * self.voxel_size
    }

    fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn resolution_for(voxel_size: f32) -> Result<usize, VolumeError> {
    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        return Err(VolumeError::InvalidVoxelSize(voxel_size));
    }
    let steps = GRID_EXTENT / voxel_size;
    let rounded = steps.round();
    if rounded < 1.0 || (steps - rounded).abs() > RESOLUTION_TOLERANCE * rounded.max(1.0) {
        return Err(VolumeError::InvalidVoxelSize(voxel_size));
    }
    Ok(rounded as usize)
}

fn parse_number(text: &str, line_index: usize) -> Result<f32, VolumeError> {
    text.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| VolumeError::MalformedSample {
            line: line_index + 1,
            text: text.to_owned(),
        })
}
