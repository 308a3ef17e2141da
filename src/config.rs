use std::{f32::consts::PI, fs, path::Path};

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    camera::{CameraLimits, OrbitCamera, ProjectionSettings, Viewport},
    input::InputSettings,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Viewer settings. Every table and field is optional.
///
/// ```toml
/// [camera]
/// radius = 2.0
///
/// [limits]
/// max_radius = 10.0
///
/// [input]
/// drag_sensitivity = 0.01
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub camera: OrbitCamera,
    pub limits: CameraLimits,
    pub input: InputSettings,
    pub projection: ProjectionSettings,
    pub viewport: Viewport,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)?;
        info!("loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.camera;
        for (name, value) in [
            ("azimuth", c.azimuth),
            ("polar_angle", c.polar_angle),
            ("radius", c.radius),
            ("fov", c.fov),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "camera {name} must be finite, got {value}"
                )));
            }
        }
        let i = &self.input;
        for (name, value) in [
            ("drag_sensitivity", i.drag_sensitivity),
            ("pixel_wheel_scale", i.pixel_wheel_scale),
            ("line_wheel_scale", i.line_wheel_scale),
            ("page_wheel_scale", i.page_wheel_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let l = &self.limits;
        if !(l.polar_margin > 0.0 && l.polar_margin < PI / 2.0) {
            return Err(ConfigError::Invalid(format!(
                "polar_margin must lie in (0, pi/2), got {}",
                l.polar_margin
            )));
        }
        if !(l.min_radius > 0.0 && l.min_radius <= l.max_radius && l.max_radius.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "radius bounds must satisfy 0 < min <= max, got [{}, {}]",
                l.min_radius, l.max_radius
            )));
        }
        if !(l.min_fov > 0.0 && l.min_fov <= l.max_fov && l.max_fov < PI) {
            return Err(ConfigError::Invalid(format!(
                "fov bounds must satisfy 0 < min <= max < pi, got [{}, {}]",
                l.min_fov, l.max_fov
            )));
        }
        let p = &self.projection;
        if !(p.near > 0.0 && p.near < p.far && p.far.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "projection needs 0 < near < far, got near {} far {}",
                p.near, p.far
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".into()));
        }
        Ok(())
    }

    /// Starting camera, pulled inside the configured limits.
    pub fn initial_camera(&self) -> OrbitCamera {
        self.camera.clamped(&self.limits)
    }
}
