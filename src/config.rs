use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Tunable constants of the layout, animation and scaling engine.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub grid_spacing: f32,
    pub sphere_radius: f32,
    pub related_ring_radius: f32,
    pub unrelated_ring_radius: f32,
    pub focus_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// `R` in the distance falloff `exp(-(d / R)^2 / 0.1)`.
    pub scale_falloff_radius: f32,
    pub scale_epsilon: f32,
    pub distance_scaling: bool,
    pub node_radius: f32,
    pub hover_opacity: f32,
    pub position_duration_secs: f64,
    pub scale_duration_secs: f64,
    pub flip_duration_secs: f64,
    pub camera_distance: f32,
    pub camera_fov_degrees: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 200.0,
            sphere_radius: 1000.0,
            related_ring_radius: 300.0,
            unrelated_ring_radius: 4000.0,
            focus_scale: 5.0,
            min_scale: 0.25,
            max_scale: 5.0,
            scale_falloff_radius: 4000.0,
            scale_epsilon: 0.01,
            distance_scaling: true,
            node_radius: 30.0,
            hover_opacity: 0.6,
            position_duration_secs: 2.0,
            scale_duration_secs: 0.5,
            flip_duration_secs: 1.0,
            camera_distance: 2000.0,
            camera_fov_degrees: 75.0,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("config is not valid JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.min_scale > 0.0 && self.min_scale <= self.max_scale,
            "minScale must be positive and not exceed maxScale"
        );
        ensure!(
            self.focus_scale >= self.min_scale && self.focus_scale <= self.max_scale,
            "focusScale must lie within [minScale, maxScale]"
        );
        ensure!(
            self.scale_falloff_radius > 0.0,
            "scaleFalloffRadius must be positive"
        );
        ensure!(
            self.position_duration_secs > 0.0
                && self.scale_duration_secs > 0.0
                && self.flip_duration_secs > 0.0,
            "tween durations must be positive"
        );
        ensure!(
            self.camera_fov_degrees > 1.0 && self.camera_fov_degrees < 179.0,
            "cameraFovDegrees must be between 1 and 179"
        );
        Ok(())
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}
