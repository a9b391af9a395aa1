//! Textures: functions from surface coordinates to a color.

use std::path::Path;
use std::sync::Arc;

use crate::{perlin::Perlin, Color};
use ember_core::{ImageCache, ImageData};
use ember_math::Vec3;
use rand::RngCore;

/// Trait for textures evaluated at a hit point.
pub trait Texture: Send + Sync {
    /// Color at texture coordinates (u, v) and world-space point p.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// Default spatial frequency of [`CheckerTexture`].
pub const DEFAULT_CHECKER_SCALE: f32 = 10.0;

/// 3D checker pattern alternating between two textures.
///
/// The sign of `sin(s·x) + sin(s·y) + sin(s·z)` picks the texture: negative
/// selects `odd`, everything else `even`.
pub struct CheckerTexture {
    odd: Arc<dyn Texture>,
    even: Arc<dyn Texture>,
    scale: f32,
}

impl CheckerTexture {
    pub fn new(odd: Arc<dyn Texture>, even: Arc<dyn Texture>) -> Self {
        Self {
            odd,
            even,
            scale: DEFAULT_CHECKER_SCALE,
        }
    }

    /// Checker between two solid colors.
    pub fn from_colors(odd: Color, even: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(odd)), Arc::new(SolidColor::new(even)))
    }

    /// Set the spatial frequency.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let s = self.scale;
        let sines = (s * p.x).sin() + (s * p.y).sin() + (s * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like pattern driven by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    /// `scale` is the frequency of the marble veins along z.
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        Color::ONE * 0.5 * (1.0 + (self.scale * p.z + 10.0 * self.noise.turbulence(p)).sin())
    }
}

/// How an [`ImageTexture`] reads between pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Bilinear,
}

/// Returned when an image texture has no pixels to show.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Texture backed by a decoded image, addressed by the hit's (u, v).
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
    filter: TextureFilter,
}

impl ImageTexture {
    pub fn new(image: Arc<ImageData>) -> Self {
        Self {
            image: Some(image),
            filter: TextureFilter::default(),
        }
    }

    /// Decode an image file.
    ///
    /// A missing or corrupt file is logged and yields a texture that shows
    /// [`MISSING_TEXTURE_COLOR`] everywhere instead of failing the render.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match ImageData::load(path) {
            Ok(image) => Self::new(Arc::new(image)),
            Err(err) => {
                log::warn!("Using placeholder for texture {}: {}", path.display(), err);
                Self::missing()
            }
        }
    }

    /// Like [`ImageTexture::load`], sharing decoded images through `cache`.
    pub fn from_cache(cache: &mut ImageCache, path: &str) -> Self {
        match cache.load(path) {
            Ok(image) => Self::new(image),
            Err(err) => {
                log::warn!("Using placeholder for texture {}: {}", path, err);
                Self::missing()
            }
        }
    }

    fn missing() -> Self {
        Self {
            image: None,
            filter: TextureFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = &self.image else {
            return MISSING_TEXTURE_COLOR;
        };

        match self.filter {
            TextureFilter::Nearest => image.sample_nearest(u, v),
            TextureFilter::Bilinear => image.sample_bilinear(u, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::new(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.3, 0.7, Vec3::new(5.0, 1.0, 2.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_selects_by_sign() {
        let odd = Color::new(0.2, 0.3, 0.1);
        let even = Color::new(0.9, 0.9, 0.9);
        let checker = CheckerTexture::from_colors(odd, even);

        // sin(10·0.1)·3 > 0
        assert_eq!(checker.value(0.0, 0.0, Vec3::splat(0.1)), even);
        // sin(-10·0.1)·3 < 0
        assert_eq!(checker.value(0.0, 0.0, Vec3::splat(-0.1)), odd);
    }

    #[test]
    fn test_checker_scale() {
        let checker = CheckerTexture::from_colors(Color::ZERO, Color::ONE).with_scale(1.0);
        assert_eq!(checker.value(0.0, 0.0, Vec3::splat(-1.0)), Color::ZERO);
        assert_eq!(checker.value(0.0, 0.0, Vec3::splat(1.0)), Color::ONE);
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let tex = NoiseTexture::new(4.0, &mut rng);

        for i in 0..100 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.53);
            let c = tex.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }

    #[test]
    fn test_image_texture_lookup() {
        let image = ImageData::new(
            2,
            1,
            vec![Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0)],
            "<test>",
        )
        .unwrap();
        let tex = ImageTexture::new(Arc::new(image));

        assert_eq!(tex.value(0.1, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.5, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));

        let blended = ImageTexture::new(Arc::new(
            ImageData::new(2, 1, vec![Color::ZERO, Color::ONE], "<test>").unwrap(),
        ))
        .with_filter(TextureFilter::Bilinear);
        assert!((blended.value(0.5, 0.5, Vec3::ZERO) - Color::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_missing_image_falls_back() {
        let tex = ImageTexture::load("/nonexistent/earthmap.jpg");
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);

        let mut cache = ImageCache::new();
        let tex = ImageTexture::from_cache(&mut cache, "/nonexistent/earthmap.jpg");
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);
    }
}
