//! Parallel render scheduling.
//!
//! A fixed-size rayon pool renders row tiles into disjoint slices of the
//! image buffer. Tiles that panic are reported after the whole image is done.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::{panic_message, RenderError, TileFailure};
use crate::renderer::{ImageBuffer, RenderProgress};
use crate::scene::Scene;
use crate::tile::{generate_tiles, render_tile, DEFAULT_ROWS_PER_TILE};
use log::{error, info};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Cores left free for the rest of the system.
pub const RESERVED_THREADS: usize = 2;

/// Worker count used when none is configured: all cores but two, at least one.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(RESERVED_THREADS).max(1)
}

/// How a render is executed. Does not affect the image except through `seed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Worker threads, `None` for [`default_worker_count`]
    pub threads: Option<usize>,
    /// Rows per work unit
    pub rows_per_tile: u32,
    /// Base seed for the per-pixel generators
    pub seed: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            threads: None,
            rows_per_tile: DEFAULT_ROWS_PER_TILE,
            seed: 0,
        }
    }
}

/// Multi-threaded tile renderer.
pub struct Renderer {
    pool: ThreadPool,
    options: RenderOptions,
}

impl Renderer {
    /// Create a renderer with its own worker pool.
    pub fn new(options: RenderOptions) -> Result<Self, RenderError> {
        let threads = options.threads.unwrap_or_else(default_worker_count).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ember-worker-{i}"))
            .build()?;

        Ok(Self { pool, options })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Allocate an image for `scene` and render into it.
    pub fn render_scene(&self, scene: &Scene) -> Result<ImageBuffer, RenderError> {
        let mut image = ImageBuffer::for_settings(&scene.settings().render);
        self.render(scene, &mut image)?;
        Ok(image)
    }

    /// Render `scene` into `image`, blocking until every tile has finished.
    ///
    /// `image` must match the scene's width, height and sample count.
    pub fn render(&self, scene: &Scene, image: &mut ImageBuffer) -> Result<(), RenderError> {
        let settings = &scene.settings().render;
        let expected = (
            settings.image_width,
            settings.image_height(),
            settings.samples_per_pixel,
        );
        let actual = (image.width, image.height, image.samples_per_pixel);
        if expected != actual {
            return Err(RenderError::ImageSize { expected, actual });
        }

        let tiles = generate_tiles(image.height, self.options.rows_per_tile);
        info!(
            "Rendering {}x{} at {} spp, max depth {}, {} threads, {} tiles",
            image.width,
            image.height,
            settings.samples_per_pixel,
            settings.max_depth,
            self.threads(),
            tiles.len()
        );

        let start = Instant::now();
        let progress: &RenderProgress = &image.progress;
        progress.reset();

        let chunk_len = tiles
            .first()
            .map_or(1, |tile| tile.pixel_count(image.width))
            .max(1);
        let seed = self.options.seed;
        let pixels = &mut image.pixels;

        let failures: Vec<TileFailure> = self.pool.install(|| {
            pixels
                .par_chunks_mut(chunk_len)
                .zip(tiles.par_iter())
                .filter_map(|(chunk, tile)| {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        render_tile(tile, chunk, scene, seed, progress)
                    }));

                    result.err().map(|payload| {
                        let failure = TileFailure {
                            tile: *tile,
                            message: panic_message(&*payload),
                        };
                        error!("Render failed in {}", failure);
                        failure
                    })
                })
                .collect()
        });

        if !failures.is_empty() {
            return Err(RenderError::TilesFailed(failures));
        }

        info!(
            "Render finished: {} pixels in {:.2?}",
            settings.pixel_count(),
            start.elapsed()
        );
        Ok(())
    }
}

/// A render running on its own thread.
pub struct RenderHandle {
    progress: Arc<RenderProgress>,
    thread: JoinHandle<Result<ImageBuffer, RenderError>>,
}

impl RenderHandle {
    /// Fraction of pixels finished, without blocking.
    pub fn progress(&self) -> f32 {
        self.progress.ratio()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the render and take its image.
    pub fn join(self) -> Result<ImageBuffer, RenderError> {
        self.thread
            .join()
            .map_err(|payload| RenderError::RenderThread(panic_message(&*payload)))?
    }
}

/// Start rendering `scene` in the background.
pub fn spawn_render(renderer: Renderer, scene: Arc<Scene>) -> Result<RenderHandle, RenderError> {
    let mut image = ImageBuffer::for_settings(&scene.settings().render);
    let progress = image.progress();

    let thread = thread::Builder::new()
        .name("ember-render".to_string())
        .spawn(move || -> Result<ImageBuffer, RenderError> {
            renderer.render(&scene, &mut image)?;
            Ok(image)
        })?;

    Ok(RenderHandle { progress, thread })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AxisAlignedRect, Color, DiffuseLight, HitRecord, Hittable, Lambertian, Material, Sphere,
    };
    use anyhow::Result;
    use ember_core::{CameraSettings, RenderSettings, SceneSettings};
    use ember_math::{Aabb, Interval, Ray, Vec3};
    use rand::RngCore;

    const BACKGROUND: Color = Color::new(0.5, 0.7, 1.0);

    /// Camera at the origin looking down -z, 90 degree fov, pinhole, no motion blur.
    fn settings(width: u32, height: u32, samples_per_pixel: u32, max_depth: u32) -> SceneSettings {
        SceneSettings {
            camera: CameraSettings {
                look_from: Vec3::ZERO,
                look_at: Vec3::new(0.0, 0.0, -1.0),
                vup: Vec3::Y,
                vfov: 90.0,
                aperture: 0.0,
                focus_dist: 1.0,
                time0: 0.0,
                time1: 0.0,
            },
            render: RenderSettings {
                image_width: width,
                aspect_ratio: width as f32 / height as f32,
                samples_per_pixel,
                max_depth,
                background: BACKGROUND,
            },
        }
    }

    fn sphere(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Box<dyn Hittable> {
        Box::new(Sphere::new(center, radius, material))
    }

    fn options(threads: usize) -> RenderOptions {
        RenderOptions {
            threads: Some(threads),
            ..RenderOptions::default()
        }
    }

    fn random_scene(settings: SceneSettings) -> Result<Scene> {
        let mut objects = Vec::new();
        for i in 0..6 {
            let albedo = Color::new(0.2 + 0.1 * i as f32, 0.5, 0.3);
            let center = Vec3::new(i as f32 - 2.5, 0.0, -3.0 - i as f32 * 0.5);
            objects.push(sphere(center, 0.6, Arc::new(Lambertian::new(albedo))));
        }
        objects.push(sphere(
            Vec3::new(0.0, -100.5, -3.0),
            100.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        ));
        Ok(Scene::new(objects, settings)?)
    }

    #[test]
    fn test_default_worker_count() {
        assert!(default_worker_count() >= 1);
        assert!(default_worker_count() <= num_cpus::get().max(1));
    }

    #[test]
    fn test_renderer_thread_count() -> Result<()> {
        let renderer = Renderer::new(options(3))?;
        assert_eq!(renderer.threads(), 3);

        let renderer = Renderer::new(options(0))?;
        assert_eq!(renderer.threads(), 1);
        Ok(())
    }

    #[test]
    fn test_render_is_deterministic() -> Result<()> {
        let scene = random_scene(settings(16, 8, 4, 8))?;

        let first = Renderer::new(options(1))?.render_scene(&scene)?;
        let second = Renderer::new(options(1))?.render_scene(&scene)?;
        let parallel = Renderer::new(RenderOptions {
            threads: Some(4),
            rows_per_tile: 5,
            seed: 0,
        })?
        .render_scene(&scene)?;

        assert_eq!(first.pixels(), second.pixels());
        assert_eq!(first.pixels(), parallel.pixels());

        let reseeded = Renderer::new(RenderOptions {
            seed: 99,
            ..options(2)
        })?
        .render_scene(&scene)?;
        assert_ne!(first.pixels(), reseeded.pixels());
        Ok(())
    }

    #[test]
    fn test_sphere_filling_view() -> Result<()> {
        // Every primary ray hits the sphere, every bounce escapes to the background
        let albedo = Color::new(0.8, 0.4, 0.2);
        let scene = Scene::new(
            vec![sphere(
                Vec3::new(0.0, 0.0, -3.0),
                2.9,
                Arc::new(Lambertian::new(albedo)),
            )],
            settings(2, 2, 1, 2),
        )?;

        let image = Renderer::new(options(2))?.render_scene(&scene)?;
        for pixel in image.pixels() {
            assert_eq!(*pixel, albedo * BACKGROUND);
        }
        Ok(())
    }

    #[test]
    fn test_sphere_behind_camera() -> Result<()> {
        let scene = Scene::new(
            vec![sphere(
                Vec3::new(0.0, 0.0, 3.0),
                1.0,
                Arc::new(Lambertian::new(Color::splat(0.5))),
            )],
            settings(2, 2, 1, 2),
        )?;

        let image = Renderer::new(options(2))?.render_scene(&scene)?;
        assert!(image.pixels().iter().all(|p| *p == BACKGROUND));
        Ok(())
    }

    #[test]
    fn test_light_above_horizon_splits_rows() -> Result<()> {
        // Top row rays all climb and reach the ceiling, bottom row rays never do
        let light = Color::new(3.0, 2.0, 1.0);
        let scene = Scene::new(
            vec![Box::new(AxisAlignedRect::xz(
                (-1.0e9, 1.0e9),
                (-1.0e9, 1.0e9),
                1.0,
                Arc::new(DiffuseLight::new(light)),
            ))],
            settings(2, 2, 1, 1),
        )?;

        let image = Renderer::new(options(2))?.render_scene(&scene)?;
        for x in 0..2 {
            assert_eq!(image.get(x, 0), light, "top row pixel {x}");
            assert_eq!(image.get(x, 1), BACKGROUND, "bottom row pixel {x}");
        }
        Ok(())
    }

    #[test]
    fn test_sphere_partially_in_view() -> Result<()> {
        let albedo = Color::new(0.8, 0.4, 0.2);
        let scene = Scene::new(
            vec![sphere(
                Vec3::new(1.0, 0.0, -2.0),
                0.8,
                Arc::new(Lambertian::new(albedo)),
            )],
            settings(8, 8, 1, 2),
        )?;

        let image = Renderer::new(options(2))?.render_scene(&scene)?;
        let hits = image.pixels().iter().filter(|p| **p == albedo * BACKGROUND).count();
        let misses = image.pixels().iter().filter(|p| **p == BACKGROUND).count();

        assert_eq!(hits + misses, 64);
        assert!(hits > 0 && misses > 0);
        Ok(())
    }

    #[test]
    fn test_light_rectangle() -> Result<()> {
        let light = Arc::new(DiffuseLight::new(Color::splat(4.0)));
        let scene = Scene::new(
            vec![Box::new(AxisAlignedRect::xy((-2.0, 2.0), (-2.0, 2.0), -1.0, light))],
            settings(2, 2, 4, 1),
        )?;

        let image = Renderer::new(options(2))?.render_scene(&scene)?;
        for pixel in image.pixels() {
            assert_eq!(*pixel, Color::splat(16.0));
        }
        assert_eq!(image.to_rgb8(), vec![255; 12]);
        Ok(())
    }

    /// Panics for any ray heading up, misses everything else.
    struct UpwardTrap;

    impl Hittable for UpwardTrap {
        fn hit<'a>(
            &'a self,
            ray: &Ray,
            _ray_t: Interval,
            _rng: &mut dyn RngCore,
        ) -> Option<HitRecord<'a>> {
            if ray.direction().y > 0.0 {
                panic!("upward ray");
            }
            None
        }

        fn bounding_box(&self, _shutter: Interval) -> Aabb {
            Aabb::from_points(Vec3::splat(-1000.0), Vec3::splat(1000.0))
        }
    }

    #[test]
    fn test_panicking_tiles_are_collected() -> Result<()> {
        let scene = Scene::new(vec![Box::new(UpwardTrap)], settings(4, 4, 2, 3))?;
        let renderer = Renderer::new(options(2))?;

        let mut image = ImageBuffer::for_settings(&scene.settings().render);
        let result = renderer.render(&scene, &mut image);

        let Err(RenderError::TilesFailed(failures)) = result else {
            panic!("expected failed tiles");
        };
        let mut rows: Vec<u32> = failures.iter().map(|f| f.tile.first_row).collect();
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 1]);
        assert!(failures.iter().all(|f| f.message == "upward ray"));

        // The bottom half still rendered, to the background
        for y in 2..4 {
            for x in 0..4 {
                assert_eq!(image.get(x, y), BACKGROUND * 2.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_image_size_mismatch() -> Result<()> {
        let scene = random_scene(settings(8, 4, 1, 2))?;
        let renderer = Renderer::new(options(1))?;

        let mut image = ImageBuffer::new(4, 8, 1);
        let result = renderer.render(&scene, &mut image);
        assert!(matches!(result, Err(RenderError::ImageSize { .. })));
        Ok(())
    }

    #[test]
    fn test_spawn_render_reports_progress() -> Result<()> {
        let scene = Arc::new(random_scene(settings(12, 8, 2, 4))?);
        let expected = Renderer::new(options(1))?.render_scene(&scene)?;

        let handle = spawn_render(Renderer::new(options(2))?, Arc::clone(&scene))?;
        let early = handle.progress();
        assert!((0.0..=1.0).contains(&early));

        let image = handle.join()?;
        assert_eq!(image.approx_completion(), 1.0);
        assert_eq!(image.progress().completed(), scene.settings().render.pixel_count());
        assert_eq!(image.pixels(), expected.pixels());
        Ok(())
    }
}
