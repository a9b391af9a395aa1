//! Cornell box with two smoke-filled blocks.
//!
//! Usage: `cargo run --example cornell_smoke --release -- [settings.json] [output.ppm]`
//!
//! Without a settings file a 300x300 image is rendered at 100 spp.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ember_core::{CameraSettings, RenderSettings, SceneSettings};
use ember_renderer::{
    spawn_render, AxisAlignedRect, BoxShape, Color, ConstantMedium, DiffuseLight, Hittable,
    ImageBuffer, Lambertian, Material, RenderOptions, Renderer, Rotate, Scene, Translate, Vec3,
};
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => SceneSettings::from_path(&path)
            .with_context(|| format!("Failed to load settings from {path}"))?,
        None => default_settings(),
    };
    let output = args.next().unwrap_or_else(|| "cornell_smoke.ppm".to_string());

    let start = Instant::now();
    let scene = Arc::new(Scene::new(build_scene(), settings)?);
    info!("Scene built in {:?}", start.elapsed());

    let renderer = Renderer::new(RenderOptions::default())?;
    let handle = spawn_render(renderer, Arc::clone(&scene))?;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(500));
        info!("{:.1}% done", handle.progress() * 100.0);
    }
    let image = handle.join()?;

    save_ppm(&image, &output).with_context(|| format!("Failed to write {output}"))?;
    info!("Saved to {}", output);
    Ok(())
}

fn default_settings() -> SceneSettings {
    SceneSettings {
        camera: CameraSettings {
            look_from: Vec3::new(278.0, 278.0, -800.0),
            look_at: Vec3::new(278.0, 278.0, 0.0),
            vfov: 40.0,
            aperture: 0.0,
            ..CameraSettings::default()
        },
        render: RenderSettings {
            image_width: 300,
            aspect_ratio: 1.0,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
        },
    }
}

fn build_scene() -> Vec<Box<dyn Hittable>> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(7.0)));

    let wall = (0.0, 555.0);
    let mut objects: Vec<Box<dyn Hittable>> = vec![
        Box::new(AxisAlignedRect::yz(wall, wall, 555.0, green)),
        Box::new(AxisAlignedRect::yz(wall, wall, 0.0, red)),
        Box::new(AxisAlignedRect::xz((113.0, 443.0), (127.0, 432.0), 554.0, light)),
        Box::new(AxisAlignedRect::xz(wall, wall, 555.0, white.clone())),
        Box::new(AxisAlignedRect::xz(wall, wall, 0.0, white.clone())),
        Box::new(AxisAlignedRect::xy(wall, wall, 555.0, white.clone())),
    ];

    let tall = placed_box(Vec3::new(165.0, 330.0, 165.0), 15.0, Vec3::new(265.0, 0.0, 295.0), &white);
    let short = placed_box(Vec3::splat(165.0), -18.0, Vec3::new(130.0, 0.0, 65.0), &white);

    objects.push(Box::new(ConstantMedium::new(tall, 0.01, Color::ZERO)));
    objects.push(Box::new(ConstantMedium::new(short, 0.01, Color::ONE)));
    objects
}

/// Box from the origin to `size`, turned about Y and moved into place.
fn placed_box(size: Vec3, degrees: f32, offset: Vec3, material: &Arc<dyn Material>) -> Box<dyn Hittable> {
    let shape = BoxShape::new(Vec3::ZERO, size, Arc::clone(material));
    let rotated = Rotate::y(Box::new(shape), degrees);
    Box::new(Translate::new(Box::new(rotated), offset))
}

/// Write the image as an ASCII PPM.
fn save_ppm(image: &ImageBuffer, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }

    writer.flush()?;
    Ok(())
}
