//! Engine configuration.
//!
//! Defaults come from the `constants` crate; the embedded
//! `assets/ar_config.json` is applied on top, and native builds may point
//! `AR_PLACEMENT_CONFIG` at a replacement file. Problems are logged and the
//! defaults used.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use constants::placement::{
    CORRECTIVE_ROTATION_DEGREES, DEFAULT_MODEL_ID, GROWTH_DURATION_MS, GROWTH_FACTOR,
    GROWTH_TICK_MS, MODEL_PATH_TEMPLATE, PLACED_SCALE,
};
use constants::render_settings::{
    CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, RETICLE_INNER_RADIUS, RETICLE_OUTER_RADIUS,
    RETICLE_SEGMENTS,
};

const EMBEDDED_CONFIG: &str = include_str!("../assets/ar_config.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Asset path with `{id}` standing for the model identifier.
    pub path_template: String,
    pub default_id: Option<u32>,
    /// Name of the node to place; the first node when unset.
    pub primary_node: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path_template: MODEL_PATH_TEMPLATE.to_string(),
            default_id: Some(DEFAULT_MODEL_ID),
            primary_node: None,
        }
    }
}

impl ModelSettings {
    pub fn path_for(&self, model_id: u32) -> String {
        self.path_template.replace("{id}", &model_id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Local XYZ Euler rotation (degrees) applied after copying the reticle pose.
    pub corrective_rotation_degrees: [f32; 3],
    pub placed_scale: f32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            corrective_rotation_degrees: CORRECTIVE_ROTATION_DEGREES,
            placed_scale: PLACED_SCALE,
        }
    }
}

impl PlacementSettings {
    pub fn corrective_rotation(&self) -> Quat {
        let [x, y, z] = self.corrective_rotation_degrees;
        Quat::from_euler(EulerRot::XYZ, x.to_radians(), y.to_radians(), z.to_radians())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthSettings {
    pub factor: f32,
    pub tick_ms: u64,
    pub duration_ms: u64,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            factor: GROWTH_FACTOR,
            tick_ms: GROWTH_TICK_MS,
            duration_ms: GROWTH_DURATION_MS,
        }
    }
}

impl GrowthSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReticleSettings {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub segments: u32,
}

impl Default for ReticleSettings {
    fn default() -> Self {
        Self {
            inner_radius: RETICLE_INNER_RADIUS,
            outer_radius: RETICLE_OUTER_RADIUS,
            segments: RETICLE_SEGMENTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArConfig {
    pub model: ModelSettings,
    pub placement: PlacementSettings,
    pub growth: GrowthSettings,
    pub reticle: ReticleSettings,
    pub camera: CameraSettings,
}

impl ArConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let growth = &self.growth;
        if !(growth.factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "growth factor must be positive, got {}",
                growth.factor
            )));
        }
        if growth.tick_ms == 0 || growth.duration_ms < growth.tick_ms {
            return Err(ConfigError::Invalid(format!(
                "growth needs 0 < tick <= duration, got tick {} ms, duration {} ms",
                growth.tick_ms, growth.duration_ms
            )));
        }

        let reticle = &self.reticle;
        if !(reticle.inner_radius > 0.0 && reticle.inner_radius < reticle.outer_radius) {
            return Err(ConfigError::Invalid(format!(
                "reticle needs 0 < inner < outer, got {} / {}",
                reticle.inner_radius, reticle.outer_radius
            )));
        }

        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::Invalid(format!(
                "camera needs 0 < near < far, got {} / {}",
                camera.near, camera.far
            )));
        }

        if !self.placement.placed_scale.is_finite() || self.placement.placed_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "placed scale must be positive, got {}",
                self.placement.placed_scale
            )));
        }

        Ok(())
    }

    /// Effective configuration for this run. Never fails.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                warn!("{}; using built-in defaults", err);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn try_load() -> Result<Self, ConfigError> {
        match std::env::var(constants::session::CONFIG_PATH_ENV) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
                info!("Loaded config override from {}", path);
                Self::from_json(&json)
            }
            Err(_) => Self::from_json(EMBEDDED_CONFIG),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn try_load() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_CONFIG)
    }
}
