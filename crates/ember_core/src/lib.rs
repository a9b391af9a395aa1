//! Ember Core - renderer-agnostic scene description.
//!
//! This crate provides:
//!
//! - **Settings**: `CameraSettings`, `RenderSettings`, `SceneSettings`, loadable from JSON
//! - **Texture images**: decoded pixel grids and a path-keyed cache
//!
//! # Example
//!
//! ```ignore
//! use ember_core::SceneSettings;
//!
//! let settings = SceneSettings::from_path("cornell.json")?;
//! println!("{}x{} @ {} spp",
//!     settings.render.image_width,
//!     settings.render.image_height(),
//!     settings.render.samples_per_pixel);
//! ```

pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use settings::{CameraSettings, RenderSettings, SceneSettings, SettingsError};
pub use texture::{ImageCache, ImageData, TextureError, TextureResult};
