//! Ember renderer - CPU Monte Carlo path tracing.
//!
//! Scenes are built from boxed [`Hittable`]s sharing `Arc` materials and
//! textures, wrapped in a [`Scene`] together with its settings, and rendered
//! in parallel row tiles by a [`Renderer`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ember_core::SceneSettings;
//! use ember_renderer::{Lambertian, RenderOptions, Renderer, Scene, Sphere, Vec3};
//!
//! let ground = Arc::new(Lambertian::new(Vec3::splat(0.5)));
//! let objects: Vec<Box<dyn ember_renderer::Hittable>> = vec![
//!     Box::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)),
//! ];
//! let scene = Scene::new(objects, SceneSettings::default())?;
//! let image = Renderer::new(RenderOptions::default())?.render_scene(&scene)?;
//! let rgb = image.to_rgb8();
//! ```

mod bvh;
mod camera;
mod error;
mod hittable;
mod instance;
mod material;
mod medium;
mod perlin;
mod rect;
mod renderer;
pub mod sampling;
mod scene;
mod scheduler;
mod sphere;
mod texture;
mod tile;

pub use bvh::{BvhError, BvhNode};
pub use camera::Camera;
pub use error::{RenderError, TileFailure};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{Rotate, Translate};
pub use material::{
    Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult,
};
pub use medium::ConstantMedium;
pub use perlin::Perlin;
pub use rect::{AxisAlignedRect, BoxShape, Plane};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render_pixel, ImageBuffer, RenderProgress, T_MIN,
};
pub use scene::Scene;
pub use scheduler::{
    default_worker_count, spawn_render, RenderHandle, RenderOptions, Renderer, RESERVED_THREADS,
};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{
    CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, TextureFilter,
    DEFAULT_CHECKER_SCALE, MISSING_TEXTURE_COLOR,
};
pub use tile::{generate_tiles, RowTile, DEFAULT_ROWS_PER_TILE};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
