//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum depth
//! - Emission from light materials
//! - Anti-aliasing via multi-sampling

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{Camera, Color, Hittable};
use ember_core::RenderSettings;
use ember_math::{Interval, Ray};
use log::debug;
use rand::RngCore;

/// Rays closer than this to their origin are ignored (shadow acne).
pub const T_MIN: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color.
pub fn ray_color(
    ray: &Ray,
    background: Color,
    world: &dyn Hittable,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY), rng) else {
        return background;
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, background, world, depth - 1, rng);
            emission + result.attenuation * scattered_color
        }
        // Absorbed
        None => emission,
    }
}

/// Render a single pixel with multi-sampling.
///
/// Returns the raw sum of all samples; divide by the sample count on output.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..settings.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, settings.background, world, settings.max_depth, rng);
    }

    pixel_color
}

/// Pixel completion counter shared between workers and observers.
///
/// Advisory only: readers may see a slightly stale count.
#[derive(Debug)]
pub struct RenderProgress {
    completed: AtomicUsize,
    total: usize,
}

impl RenderProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    pub fn reset(&self) {
        self.completed.store(0, Ordering::Relaxed);
    }

    /// Record one finished pixel.
    pub fn pixel_done(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % 1000 == 0 {
            debug!("{}/{} pixels rendered", done, self.total);
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Fraction of pixels finished, in `[0, 1]`.
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed() as f32 / self.total as f32).min(1.0)
    }
}

/// Image buffer holding accumulated, unnormalized sample sums.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub(crate) pixels: Vec<Color>,
    pub(crate) progress: Arc<RenderProgress>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            samples_per_pixel,
            pixels: vec![Color::ZERO; count],
            progress: Arc::new(RenderProgress::new(count)),
        }
    }

    /// Buffer sized for the given render settings.
    pub fn for_settings(settings: &RenderSettings) -> Self {
        Self::new(
            settings.image_width,
            settings.image_height(),
            settings.samples_per_pixel,
        )
    }

    /// Get the pixel at (x, y), row 0 at the top.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Shared progress counter, readable while a render is running.
    pub fn progress(&self) -> Arc<RenderProgress> {
        Arc::clone(&self.progress)
    }

    pub fn approx_completion(&self) -> f32 {
        self.progress.ratio()
    }

    /// Convert to gamma-corrected RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color, self.samples_per_pixel));
        }
        bytes
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a summed pixel color to 8-bit RGB.
///
/// Averages over `samples_per_pixel`, applies gamma 2 and maps `[0, 0.999]`
/// onto `0..=255`.
pub fn color_to_rgb8(color: Color, samples_per_pixel: u32) -> [u8; 3] {
    const INTENSITY: Interval = Interval::new(0.0, 0.999);

    let scale = 1.0 / samples_per_pixel.max(1) as f32;
    let channel = |c: f32| (256.0 * INTENSITY.clamp(linear_to_gamma(c * scale))) as u8;

    [channel(color.x), channel(color.y), channel(color.z)]
}
