//! Constant-density participating media (smoke, fog).

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    material::{Color, Isotropic},
    sampling::gen_f32,
    texture::Texture,
};
use ember_math::{Aabb, Interval, Ray, Vec3};
use log::warn;
use rand::RngCore;

/// A volume of constant density filling a closed boundary.
///
/// Rays passing through are scattered at an exponentially distributed
/// distance, so intersections are stochastic.
pub struct ConstantMedium {
    boundary: Box<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new(boundary: Box<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self::with_phase(boundary, density, Isotropic::new(albedo))
    }

    pub fn with_texture(boundary: Box<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self::with_phase(boundary, density, Isotropic::with_texture(albedo))
    }

    fn with_phase(boundary: Box<dyn Hittable>, density: f32, phase_function: Isotropic) -> Self {
        let neg_inv_density = if density > 0.0 && density.is_finite() {
            -1.0 / density
        } else {
            warn!("Medium density {density} is not positive, the volume will be invisible");
            0.0
        };

        Self {
            boundary,
            neg_inv_density,
            phase_function,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if self.neg_inv_density == 0.0 {
            return None;
        }

        // Entry and exit crossings of the boundary along the whole line
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 0.0001, f32::INFINITY), rng)?;

        let mut t1 = entry.t.max(ray_t.min);
        let t2 = exit.t.min(ray_t.max);
        if t1 >= t2 {
            return None;
        }
        t1 = t1.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside = (t2 - t1) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = t1 + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X, // arbitrary
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self, shutter: Interval) -> Aabb {
        self.boundary.bounding_box(shutter)
    }
}
