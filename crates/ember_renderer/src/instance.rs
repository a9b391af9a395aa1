//! Instancing wrappers that move a hittable without copying its geometry.

use crate::hittable::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Mat4, Mat4Ext, Quat, Ray, Vec3};
use rand::RngCore;

/// Hittable displaced by a constant offset.
pub struct Translate {
    object: Box<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(object: Box<dyn Hittable>, offset: Vec3) -> Self {
        Self { object, offset }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Move the ray into object space
        let offset_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let rec = self.object.hit(&offset_ray, ray_t, rng)?;

        Some(HitRecord {
            p: rec.p + self.offset,
            ..rec
        })
    }

    fn bounding_box(&self, shutter: Interval) -> Aabb {
        self.object.bounding_box(shutter).translate(self.offset)
    }
}

/// Hittable rotated about an axis through the origin.
pub struct Rotate {
    object: Box<dyn Hittable>,
    /// Object space to world space
    to_world: Mat4,
    /// World space to object space
    to_object: Mat4,
}

impl Rotate {
    /// Rotate `object` by `degrees` around `axis` (right-handed).
    ///
    /// A zero or non-finite axis leaves the object unrotated.
    pub fn new(object: Box<dyn Hittable>, axis: Vec3, degrees: f32) -> Self {
        let rotation = match axis.try_normalize() {
            Some(axis) => Quat::from_axis_angle(axis, degrees.to_radians()),
            None => Quat::IDENTITY,
        };
        let to_world = Mat4::from_quat(rotation);

        Self {
            object,
            to_world,
            to_object: Mat4::from_quat(rotation.inverse()),
        }
    }

    /// Rotation about the +Y axis.
    pub fn y(object: Box<dyn Hittable>, degrees: f32) -> Self {
        Self::new(object, Vec3::Y, degrees)
    }
}

impl Hittable for Rotate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = self.to_object.transform_ray(ray);
        let rec = self.object.hit(&local_ray, ray_t, rng)?;

        // Rotations preserve dot products, so front_face carries over
        Some(HitRecord {
            p: self.to_world.transform_point3(rec.p),
            normal: self.to_world.transform_vector3(rec.normal),
            ..rec
        })
    }

    fn bounding_box(&self, shutter: Interval) -> Aabb {
        self.to_world
            .transform_aabb(&self.object.bounding_box(shutter))
    }
}
