//! Camera and render settings for a scene.
//!
//! These are plain data: the renderer turns them into a `Camera` and sizes its
//! image buffer from them. Missing JSON fields fall back to the defaults below.

use std::path::Path;

use ember_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Camera placement, lens and shutter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Camera position
    pub look_from: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// World up vector (usually 0,1,0)
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Lens diameter; 0 disables depth of field
    pub aperture: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
    /// Shutter open time
    pub time0: f32,
    /// Shutter close time
    pub time1: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 40.0,
            aperture: 0.1,
            focus_dist: 10.0,
            time0: 0.0,
            time1: 1.0,
        }
    }
}

/// Image size and sampling quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub image_width: u32,
    /// Width over height
    pub aspect_ratio: f32,
    /// Random camera rays per pixel
    pub samples_per_pixel: u32,
    /// Maximum number of light bounces
    pub max_depth: u32,
    /// Radiance returned by rays that escape the scene
    pub background: Vec3,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 50,
            max_depth: 50,
            background: Vec3::ZERO,
        }
    }
}

impl RenderSettings {
    /// Image height derived from width and aspect ratio, never below one row.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Total number of pixels in the image.
    pub fn pixel_count(&self) -> usize {
        self.image_width as usize * self.image_height() as usize
    }
}

/// Everything about a scene except its geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub camera: CameraSettings,
    pub render: RenderSettings,
}

impl SceneSettings {
    /// Parse and validate settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: SceneSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::debug!("Loaded scene settings from {}", path.display());
        Ok(settings)
    }

    /// Check the invariants the renderer relies on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let render = &self.render;
        let camera = &self.camera;

        if render.image_width == 0 {
            return Err(invalid("image_width must be positive"));
        }
        if !(render.aspect_ratio.is_finite() && render.aspect_ratio > 0.0) {
            return Err(invalid("aspect_ratio must be a positive finite number"));
        }
        if render.samples_per_pixel == 0 {
            return Err(invalid("samples_per_pixel must be positive"));
        }
        if !(camera.vfov > 0.0 && camera.vfov < 180.0) {
            return Err(invalid("vfov must be between 0 and 180 degrees"));
        }
        if !(camera.focus_dist.is_finite() && camera.focus_dist > 0.0) {
            return Err(invalid("focus_dist must be a positive finite number"));
        }
        if !(camera.aperture >= 0.0) {
            return Err(invalid("aperture must not be negative"));
        }
        if !(camera.time1 >= camera.time0) {
            return Err(invalid("shutter close time precedes open time"));
        }
        if (camera.look_from - camera.look_at).length_squared() == 0.0 {
            return Err(invalid("look_from and look_at must differ"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> SettingsError {
    SettingsError::Invalid(message.to_string())
}
