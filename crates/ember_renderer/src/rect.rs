//! Axis-aligned rectangles and boxes built from them.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    Material,
};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// The plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Plane {
    /// Axis indices `(a, b, k)`: the two in-plane axes and the fixed one.
    pub fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::Xy => (0, 1, 2),
            Plane::Xz => (0, 2, 1),
            Plane::Yz => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` on the plane where the fixed axis equals `k`.
///
/// The outward normal points along the positive fixed axis unless the
/// rectangle was [`flipped`](AxisAlignedRect::flipped).
pub struct AxisAlignedRect {
    plane: Plane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
    material: Arc<dyn Material>,
    outward_normal: Vec3,
}

impl AxisAlignedRect {
    pub fn new(
        plane: Plane,
        (a0, a1): (f32, f32),
        (b0, b1): (f32, f32),
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        let (_, _, k_axis) = plane.axes();
        let mut outward_normal = Vec3::ZERO;
        outward_normal[k_axis] = 1.0;

        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            material,
            outward_normal,
        }
    }

    /// Rectangle in the XY plane at `z = k`.
    pub fn xy(x: (f32, f32), y: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Xy, x, y, k, material)
    }

    /// Rectangle in the XZ plane at `y = k`.
    pub fn xz(x: (f32, f32), z: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Xz, x, z, k, material)
    }

    /// Rectangle in the YZ plane at `x = k`.
    pub fn yz(y: (f32, f32), z: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Yz, y, z, k, material)
    }

    /// Reverse the outward normal.
    pub fn flipped(mut self) -> Self {
        self.outward_normal = -self.outward_normal;
        self
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }
}

impl Hittable for AxisAlignedRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Zero-area rectangles would divide by zero in the UV mapping
        if !(self.a1 > self.a0 && self.b1 > self.b0) {
            return None;
        }

        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        // Parallel rays give an infinite or NaN t, which surrounds() rejects
        let t = (self.k - origin[k_axis]) / direction[k_axis];
        if !ray_t.surrounds(t) {
            return None;
        }

        let a = origin[a_axis] + t * direction[a_axis];
        let b = origin[b_axis] + t * direction[b_axis];
        if !(self.a0..=self.a1).contains(&a) || !(self.b0..=self.b1).contains(&b) {
            return None;
        }

        let uv = (
            (a - self.a0) / (self.a1 - self.a0),
            (b - self.b0) / (self.b1 - self.b0),
        );
        Some(HitRecord::new(
            ray,
            t,
            self.outward_normal,
            uv,
            &*self.material,
        ))
    }

    fn bounding_box(&self, _shutter: Interval) -> Aabb {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;
        lo[a_axis] = self.a0;
        hi[a_axis] = self.a1;
        lo[b_axis] = self.b0;
        hi[b_axis] = self.b1;
        lo[k_axis] = self.k;
        hi[k_axis] = self.k;

        // from_points pads the flat axis
        Aabb::from_points(lo, hi)
    }
}

/// Axis-aligned box made of six rectangles with outward-facing normals.
pub struct BoxShape {
    min: Vec3,
    max: Vec3,
    sides: HittableList,
}

impl BoxShape {
    /// Create a box spanning the two corners, given in any order.
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);

        let x = (min.x, max.x);
        let y = (min.y, max.y);
        let z = (min.z, max.z);

        let mut sides = HittableList::new();
        sides.add(Box::new(AxisAlignedRect::xy(x, y, max.z, material.clone())));
        sides.add(Box::new(
            AxisAlignedRect::xy(x, y, min.z, material.clone()).flipped(),
        ));
        sides.add(Box::new(AxisAlignedRect::xz(x, z, max.y, material.clone())));
        sides.add(Box::new(
            AxisAlignedRect::xz(x, z, min.y, material.clone()).flipped(),
        ));
        sides.add(Box::new(AxisAlignedRect::yz(y, z, max.x, material.clone())));
        sides.add(Box::new(AxisAlignedRect::yz(y, z, min.x, material).flipped()));

        Self { min, max, sides }
    }
}

impl Hittable for BoxShape {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _shutter: Interval) -> Aabb {
        Aabb::from_points(self.min, self.max)
    }
}
