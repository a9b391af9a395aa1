//! Perlin gradient noise.

use crate::sampling::random_unit_vector;
use ember_math::Vec3;
use rand::seq::SliceRandom;
use rand::RngCore;

const POINT_COUNT: usize = 256;

/// Octaves summed by [`Perlin::turbulence`].
const TURBULENCE_DEPTH: u32 = 7;

/// Lattice of random unit gradients hashed by three permutation tables.
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT).map(|_| random_unit_vector(rng)).collect();

        Self {
            gradients,
            perm_x: Self::permutation(rng),
            perm_y: Self::permutation(rng),
            perm_z: Self::permutation(rng),
        }
    }

    fn permutation(rng: &mut dyn RngCore) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
        perm.shuffle(rng);
        perm
    }

    /// Smooth noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let base = p.floor();
        let frac = p - base;
        let (i, j, k) = (base.x as i64, base.y as i64, base.z as i64);

        // Hermite smoothing of the fractional position
        let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);

        let mut accum = 0.0;
        for di in 0..2 {
            for dj in 0..2 {
                for dk in 0..2 {
                    let gradient = self.gradients[self.perm_x[wrap(i.wrapping_add(di))]
                        ^ self.perm_y[wrap(j.wrapping_add(dj))]
                        ^ self.perm_z[wrap(k.wrapping_add(dk))]];

                    let corner = Vec3::new(di as f32, dj as f32, dk as f32);
                    let weight = frac - corner;
                    let blend = (corner * smooth + (Vec3::ONE - corner) * (Vec3::ONE - smooth))
                        .element_product();

                    accum += blend * gradient.dot(weight);
                }
            }
        }

        accum
    }

    /// Sum of octaves of |noise|, halving weight and doubling frequency each step.
    pub fn turbulence(&self, p: Vec3) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..TURBULENCE_DEPTH {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn wrap(i: i64) -> usize {
    (i & (POINT_COUNT as i64 - 1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_vanishes_on_lattice_points() {
        let mut rng = StdRng::seed_from_u64(1);
        let perlin = Perlin::new(&mut rng);

        // Gradient noise is zero at integer coordinates
        assert!(perlin.noise(Vec3::new(3.0, -2.0, 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(9));
        let b = Perlin::new(&mut StdRng::seed_from_u64(9));

        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.13, i as f32 * 0.71, -(i as f32) * 0.29);
            let n = a.noise(p);
            assert_eq!(n, b.noise(p));
            assert!(n.abs() <= 1.8);
            assert!(a.turbulence(p) >= 0.0);
        }
    }

    #[test]
    fn test_wrap_handles_negative_coordinates() {
        assert_eq!(wrap(-1), 255);
        assert_eq!(wrap(256), 0);
        assert_eq!(wrap(5), 5);
    }

    #[test]
    fn test_far_coordinates_do_not_overflow() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(11));

        // Later octaves scale past i64::MAX, where the float cast saturates
        let far = perlin.turbulence(Vec3::new(2.0e17, 0.0, 0.0));
        assert!(far.is_finite());
        assert!(perlin.noise(Vec3::splat(-1.0e30)).is_finite());

        let _ = perlin.turbulence(Vec3::new(f32::INFINITY, 0.0, f32::NEG_INFINITY));
    }
}
