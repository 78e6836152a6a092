//! Seeded random source for pose search.

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, UnitBall, UnitSphere};

use super::Pose;

/// Random number generator for the search strategies.
///
/// Implements [`RngCore`], so it can also drive subject reevaluation.
#[derive(Debug, Clone)]
pub struct PoseRng {
    rng: StdRng,
}

impl PoseRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform value in [0, 1).
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }

    /// Uniform value in [-1, 1).
    #[inline]
    pub fn signed(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform point inside the unit ball.
    pub fn in_unit_ball(&mut self) -> Vector3<f32> {
        let [x, y, z]: [f32; 3] = UnitBall.sample(&mut self.rng);
        Vector3::new(x, y, z)
    }

    /// Uniform point on the unit sphere.
    pub fn on_unit_sphere(&mut self) -> Vector3<f32> {
        let [x, y, z]: [f32; 3] = UnitSphere.sample(&mut self.rng);
        Vector3::new(x, y, z)
    }

    /// Random pose within `radius` of `center`, looking at a point within unit
    /// distance of it.
    pub fn scatter(&mut self, center: &Point3<f32>, radius: f32) -> Pose {
        let position = center + self.in_unit_ball() * radius;
        let look_at = center + self.in_unit_ball();
        Pose::new(position, look_at)
    }
}

impl RngCore for PoseRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
