//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over the scene's top-level hittables. Built once with a median
//! split on an axis that cycles with depth, then only read while rendering.

use crate::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray};
use log::debug;
use rand::RngCore;
use thiserror::Error;

/// BVH construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    #[error("cannot build a BVH over an empty object list")]
    Empty,
}

/// BVH node - either a branch with two children or a leaf with one object.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node wrapping a single object.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Object boxes are taken over `shutter`, so moving geometry is bounded
    /// for every ray time the camera can produce.
    pub fn new(objects: Vec<Box<dyn Hittable>>, shutter: Interval) -> Result<Self, BvhError> {
        if objects.is_empty() {
            return Err(BvhError::Empty);
        }

        let count = objects.len();
        let bvh = Self::build(objects, shutter, 0);
        debug!("Built BVH over {} objects, depth {}", count, bvh.depth());

        Ok(bvh)
    }

    /// Recursive BVH construction.
    ///
    /// Objects are sorted by the low end of their box on the split axis and
    /// cut in half. `objects` is never empty here.
    fn build(objects: Vec<Box<dyn Hittable>>, shutter: Interval, depth: usize) -> Self {
        let axis = depth % 3;

        let mut keyed: Vec<(f32, Aabb, Box<dyn Hittable>)> = objects
            .into_iter()
            .map(|object| {
                let bbox = object.bounding_box(shutter);
                (bbox.axis_interval(axis).min, bbox, object)
            })
            .collect();

        if keyed.len() == 1 {
            if let Some((_, bbox, object)) = keyed.pop() {
                return BvhNode::Leaf { object, bbox };
            }
        }

        // Stable and NaN-safe
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mid = keyed.len() / 2;
        let right_objects: Vec<_> = keyed.split_off(mid).into_iter().map(|(_, _, o)| o).collect();
        let left_objects: Vec<_> = keyed.into_iter().map(|(_, _, o)| o).collect();

        let left = Self::build(left_objects, shutter, depth + 1);
        let right = Self::build(right_objects, shutter, depth + 1);
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// Cached box of this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Number of levels, counting a lone leaf as 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                object.hit(ray, ray_t, rng)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _shutter: Interval) -> Aabb {
        self.bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{gen_f32, gen_range, random_unit_vector, random_vec3};
    use crate::{
        AxisAlignedRect, HittableList, Lambertian, Material, MovingSphere, Sphere,
    };
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    type Color = Vec3;

    fn shutter() -> Interval {
        Interval::new(0.0, 1.0)
    }

    fn material() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn test_bvh_empty() {
        let result = BvhNode::new(vec![], shutter());
        assert!(matches!(result, Err(BvhError::Empty)));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, material());
        let bvh = BvhNode::new(vec![Box::new(sphere)], shutter()).unwrap();

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let rec = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng);
        assert!((rec.unwrap().t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Box<dyn Hittable>> = (0..10)
            .map(|i| {
                let sphere = Sphere::new(Vec3::new(i as f32, 0.0, -5.0), 0.5, material());
                Box::new(sphere) as Box<dyn Hittable>
            })
            .collect();

        let bvh = BvhNode::new(spheres, shutter()).unwrap();
        assert_eq!(bvh.depth(), 5);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);

        let bbox = bvh.bbox();
        assert!((bbox.x.min + 0.5).abs() < 1e-5);
        assert!((bbox.x.max - 9.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(42);

        for scene in 0..8 {
            let count = 1 + scene * 9;
            let mut shared: Vec<Arc<dyn Hittable>> = Vec::new();
            for i in 0..count {
                let material = material();
                let center = random_vec3(&mut rng, -10.0, 10.0);
                let object: Arc<dyn Hittable> = match i % 3 {
                    0 => Arc::new(Sphere::new(center, gen_range(&mut rng, 0.2, 2.0), material)),
                    1 => Arc::new(MovingSphere::new(
                        center,
                        center + random_vec3(&mut rng, -1.0, 1.0),
                        0.0,
                        1.0,
                        gen_range(&mut rng, 0.2, 1.5),
                        material,
                    )),
                    _ => Arc::new(AxisAlignedRect::xz(
                        (center.x - 1.0, center.x + 1.5),
                        (center.z - 2.0, center.z + 0.5),
                        center.y,
                        material,
                    )),
                };
                shared.push(object);
            }

            let boxed = |objects: &[Arc<dyn Hittable>]| -> Vec<Box<dyn Hittable>> {
                objects
                    .iter()
                    .map(|o| Box::new(o.clone()) as Box<dyn Hittable>)
                    .collect()
            };
            let list = HittableList::from(boxed(&shared));
            let bvh = BvhNode::new(boxed(&shared), shutter()).unwrap();

            for _ in 0..300 {
                let origin = random_vec3(&mut rng, -15.0, 15.0);
                let ray = Ray::new(origin, random_unit_vector(&mut rng), gen_f32(&mut rng));
                let t_max = if gen_f32(&mut rng) < 0.3 {
                    gen_range(&mut rng, 1.0, 20.0)
                } else {
                    f32::INFINITY
                };
                let ray_t = Interval::new(0.001, t_max);

                let expected = list.hit(&ray, ray_t, &mut rng);
                let actual = bvh.hit(&ray, ray_t, &mut rng);

                match (expected, actual) {
                    (None, None) => {}
                    (Some(e), Some(a)) => {
                        assert!((e.t - a.t).abs() < 1e-5, "t {} vs {}", e.t, a.t);
                        assert!(std::ptr::addr_eq(e.material, a.material));
                    }
                    (e, a) => panic!(
                        "linear scan hit: {}, bvh hit: {}",
                        e.is_some(),
                        a.is_some()
                    ),
                }
            }
        }
    }

    #[test]
    fn test_split_axis_cycles_with_depth() {
        // Spheres spread along y only: the root sorts on x, where all keys tie
        let spheres: Vec<Box<dyn Hittable>> = (0..4)
            .map(|i| {
                Box::new(Sphere::new(Vec3::new(0.0, i as f32 * 10.0, 0.0), 1.0, material()))
                    as Box<dyn Hittable>
            })
            .collect();
        let bvh = BvhNode::new(spheres, shutter()).unwrap();

        let BvhNode::Branch { left, right, .. } = &bvh else {
            panic!("expected a branch at the root");
        };
        assert!(left.bbox().y.max < right.bbox().y.min);
        assert_eq!(bvh.depth(), 3);

        // Second level sorts on y
        let BvhNode::Branch { left: first, right: second, .. } = &**right else {
            panic!("expected a branch below the root");
        };
        assert!(first.bbox().y.max < second.bbox().y.min);
    }
}
