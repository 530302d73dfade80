//! Seed-keyed random helpers for behaviors.
//!
//! Behaviors must not use shared random state, so every random choice a
//! particle makes is drawn from a generator keyed by its own `seed`. The same
//! particle therefore makes the same choices on every replay.
//!
//! ```ignore
//! let mut ctx = SpawnContext::new(state.seed);
//! let direction = ctx.random_in_cone(Vec3::Y, 0.3);
//! let lifetime = ctx.random_range(40.0, 80.0);
//! ```

use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Random source derived from a particle seed.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Context keyed by a particle seed.
    pub fn new(seed: f32) -> Self {
        Self::salted(seed, 0)
    }

    /// Context keyed by a particle seed and a stream selector, so one
    /// particle can draw several independent sequences.
    pub fn salted(seed: f32, salt: u64) -> Self {
        let key = (seed.to_bits() as u64) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            rng: SmallRng::seed_from_u64(key),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `min..max`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    // ========== Position helpers ==========

    /// Random point on a ring (circle) in the XZ plane at y=0.
    pub fn random_on_ring(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin())
    }

    // ========== Direction helpers ==========

    /// Random unit vector, uniform on the unit sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        let z: f32 = self.rng.gen_range(-1.0..1.0);
        let theta = self.rng.gen_range(0.0..TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }

    /// Random unit vector within `spread` radians of `axis`.
    ///
    /// A zero spread returns the normalized axis.
    pub fn random_in_cone(&mut self, axis: Vec3, spread: f32) -> Vec3 {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        let spread = spread.clamp(0.0, PI);
        let cos_max = spread.cos();
        let z = self.random_range(cos_max, 1.0);
        let theta = self.rng.gen_range(0.0..TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        let local = Vec3::new(r * theta.cos(), r * theta.sin(), z);
        Quat::from_rotation_arc(Vec3::Z, axis) * local
    }
}
