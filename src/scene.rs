use crate::camera::{Matrix4, identity_matrix, invert, perspective_matrix, translate, transpose};
use crate::config::ViewerConfig;
use crate::error::{RenderError, Result};
use crate::input::Key;

/// Light angles in whole degrees.
///
/// Both angles are reduced with a truncating `% 360` after each step, so they
/// stay in (-360, 360) and keep their sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    pub azimuth: i32,
    pub elevation: i32,
}

impl LightState {
    pub fn direction(&self) -> [f32; 3] {
        let theta = (self.elevation as f32).to_radians();
        let phi = (self.azimuth as f32).to_radians();
        [theta.cos() * phi.sin(), theta.sin(), -theta.cos() * phi.cos()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model_view: Matrix4,
    pub projection: Matrix4,
    pub normal: Matrix4,
}

pub struct SceneState {
    light: LightState,
    step: i32,
    camera_translation: [f32; 3],
    fov_y_radians: f32,
    near: f32,
    far: f32,
}

impl SceneState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            light: LightState {
                azimuth: config.initial_azimuth % 360,
                elevation: config.initial_elevation % 360,
            },
            step: config.angle_step % 360,
            camera_translation: config.camera_translation,
            fov_y_radians: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
        }
    }

    pub fn on_key(&mut self, key: Key) {
        let light = &mut self.light;
        match key {
            Key::Left => light.azimuth = (light.azimuth - self.step) % 360,
            Key::Right => light.azimuth = (light.azimuth + self.step) % 360,
            Key::Up => light.elevation = (light.elevation + self.step) % 360,
            Key::Down => light.elevation = (light.elevation - self.step) % 360,
        }
        log::debug!(
            "light azimuth={} elevation={}",
            light.azimuth,
            light.elevation
        );
    }

    pub fn light(&self) -> LightState {
        self.light
    }

    pub fn current_light_direction(&self) -> [f32; 3] {
        self.light.direction()
    }

    pub fn current_transforms(&self, aspect: f32) -> Result<Transforms> {
        let projection = perspective_matrix(self.fov_y_radians, aspect, self.near, self.far)
            .map_err(RenderError::Projection)?;
        let model_view = translate(&identity_matrix(), self.camera_translation);
        let inverse = invert(&model_view).ok_or(RenderError::Projection("model-view is singular"))?;
        Ok(Transforms {
            model_view,
            projection,
            normal: transpose(&inverse),
        })
    }
}
