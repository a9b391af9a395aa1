// Transform utilities for Mat4
//
// Extends glam::Mat4 with the operations the instancing wrappers need.
// glam::Mat4 already provides transform_point3(), transform_vector3() and inverse().

use crate::{Aabb, Ray};
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide ray tracing transform utilities.
pub trait Mat4Ext {
    /// Transform a ray: the origin as a point, the direction as a vector.
    /// Time is carried over unchanged.
    fn transform_ray(&self, ray: &Ray) -> Ray;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform_point3(ray.origin()),
            self.transform_vector3(ray.direction()),
            ray.time(),
        )
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let lo = aabb.min();
        let hi = aabb.max();

        let mut result_min = Vec3::splat(f32::INFINITY);
        let mut result_max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let transformed = self.transform_point3(corner);
            result_min = result_min.min(transformed);
            result_max = result_max.max(transformed);
        }

        Aabb::from_points(result_min, result_max)
    }
}
