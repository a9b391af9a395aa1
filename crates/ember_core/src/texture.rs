//! Texture image loading and caching.
//!
//! Decodes images from disk into a grid of linear float colors that image
//! textures sample from. Images are shared by `Arc` so several materials can
//! reference the same decoded file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ember_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image.
///
/// Stores RGB components scaled to 0-1, row-major with row 0 at the top.
#[derive(Clone, Debug)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    pixels: Vec<Vec3>,

    /// Original file path (for debugging)
    pub path: String,
}

impl ImageData {
    /// Create an image from pixel data.
    ///
    /// Fails if the pixel count does not match the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Vec3>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        let path = path.into();
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(TextureError::LoadError(format!(
                "{}: {} pixels for a {}x{} image",
                path,
                pixels.len(),
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
            path,
        })
    }

    /// Decode an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let img = image::load_from_memory(&bytes)?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        // Stored as-is, divided by 255 (no sRGB decode)
        let scale = 1.0 / 255.0;
        let pixels = rgb
            .pixels()
            .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32) * scale)
            .collect();

        Self::new(width, height, pixels, path.to_string_lossy())
    }

    /// Color of the pixel at integer coordinates, clamped to the image edges.
    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Nearest-pixel lookup.
    ///
    /// UV coordinates are clamped to [0, 1], with (0, 0) at bottom-left.
    pub fn sample_nearest(&self, u: f32, v: f32) -> Vec3 {
        let (x, y) = self.to_pixel_space(u, v, self.width as f32, self.height as f32);
        self.pixel(x as u32, y as u32)
    }

    /// Bilinear lookup between the four nearest pixel centers.
    ///
    /// UV coordinates are clamped to [0, 1], with (0, 0) at bottom-left.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Vec3 {
        let (x, y) = self.to_pixel_space(
            u,
            v,
            (self.width - 1) as f32,
            (self.height - 1) as f32,
        );

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let fx = x.fract();
        let fy = y.fract();

        let top = self.pixel(x0, y0).lerp(self.pixel(x0 + 1, y0), fx);
        let bottom = self.pixel(x0, y0 + 1).lerp(self.pixel(x0 + 1, y0 + 1), fx);
        top.lerp(bottom, fy)
    }

    fn to_pixel_space(&self, u: f32, v: f32, span_x: f32, span_y: f32) -> (f32, f32) {
        // NaN coordinates land on the first pixel
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

        // Flip V for image coordinates
        (u * span_x, (1.0 - v) * span_y)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

/// Cache for decoded images.
///
/// Images are loaded on demand and shared between every texture that names
/// the same path.
pub struct ImageCache {
    /// Cached images by file path
    images: HashMap<String, Arc<ImageData>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl ImageCache {
    /// Create a new empty image cache.
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create an image cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            images: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load an image from file, using the cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<ImageData>> {
        if let Some(image) = self.images.get(path) {
            return Ok(image.clone());
        }

        let full_path = self.resolve_path(path);
        let image = match ImageData::load(&full_path) {
            Ok(image) => Arc::new(image),
            Err(e) => {
                log::warn!("Failed to load texture {}: {}", full_path.display(), e);
                return Err(e);
            }
        };
        self.images.insert(path.to_string(), image.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            image.width,
            image.height,
            image.size_bytes() as f32 / 1024.0
        );

        Ok(image)
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}
