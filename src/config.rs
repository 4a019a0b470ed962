use serde::Deserialize;

use crate::error::{RenderError, Result};

/// Fixed scene constants. Hosts may override any subset from JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub clear_color: [f32; 4],
    /// Offset applied to the model-view matrix; the mesh sits this far down
    /// the view axis.
    pub camera_translation: [f32; 3],
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub material_diffuse: [f32; 4],
    /// Degrees added per arrow-key press.
    pub angle_step: i32,
    pub initial_azimuth: i32,
    pub initial_elevation: i32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            camera_translation: [0.0, 0.0, -1.5],
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 10000.0,
            light_ambient: [0.01, 0.01, 0.01, 1.0],
            light_diffuse: [0.5, 0.5, 0.5, 1.0],
            material_diffuse: [0.5, 0.8, 0.1, 1.0],
            angle_step: 10,
            initial_azimuth: 0,
            initial_elevation: 0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fov_y_degrees.is_finite() || self.fov_y_degrees <= 0.0 || self.fov_y_degrees >= 180.0 {
            return Err(RenderError::Config(format!(
                "fovYDegrees must be in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        if !self.near.is_finite() || !self.far.is_finite() || self.near <= 0.0 || self.far <= self.near {
            return Err(RenderError::Config(format!(
                "clipping planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        if self.angle_step == 0 || self.angle_step.unsigned_abs() >= 360 {
            return Err(RenderError::Config(format!(
                "angleStep must be non-zero and within (-360, 360), got {}",
                self.angle_step
            )));
        }
        let colors = [
            ("clearColor", &self.clear_color),
            ("lightAmbient", &self.light_ambient),
            ("lightDiffuse", &self.light_diffuse),
            ("materialDiffuse", &self.material_diffuse),
        ];
        for (name, color) in colors {
            if color.iter().any(|c| !c.is_finite()) {
                return Err(RenderError::Config(format!("{name} must be finite")));
            }
        }
        if self.camera_translation.iter().any(|c| !c.is_finite()) {
            return Err(RenderError::Config("cameraTranslation must be finite".into()));
        }
        Ok(())
    }
}
