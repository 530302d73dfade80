//! Pooled snapshot record for one particle at one step.

use crate::history::Record;
use crate::particle::Particle;
use glam::{Quat, Vec3};

/// Renderable state of one particle captured by a [`History`](crate::history::History) commit.
///
/// Dots are never created per frame: the history allocates them once and
/// [`Dot::copy_from`] overwrites them in place. Zero opacity means the slot
/// held no particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub seed: f32,
    pub lifetime: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub opacity: f32,
    pub hue: f32,
}

impl Dot {
    /// Copy a particle's state into this record.
    pub fn copy_from(particle: &Particle, dot: &mut Dot) {
        let state = &particle.state;
        dot.seed = state.seed;
        dot.lifetime = state.lifetime;
        dot.position = state.position;
        dot.rotation = state.rotation;
        dot.opacity = state.opacity;
        dot.hue = state.hue;
    }
}

impl Default for Dot {
    fn default() -> Self {
        Self {
            seed: 0.0,
            lifetime: 0.0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            opacity: 0.0,
            hue: 0.0,
        }
    }
}

impl Record for Dot {
    #[inline]
    fn mark_empty(&mut self) {
        self.opacity = 0.0;
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.opacity == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Fate, FnBehavior, Offspring};
    use crate::particle::{ParticleId, ParticleState};

    #[test]
    fn test_copy_is_exact_and_detached() {
        let mut particle = Particle::new(
            ParticleId(1),
            0.25,
            Box::new(FnBehavior(|_: &mut ParticleState, _: f32, _: &mut Offspring| {
                Fate::Alive
            })),
        );
        particle.state.lifetime = 12.0;
        particle.state.position = Vec3::new(1.0, -2.0, 3.5);
        particle.state.rotation = Quat::from_rotation_y(0.7);
        particle.state.opacity = 0.8;
        particle.state.hue = 210.0;

        let mut dot = Dot::default();
        Dot::copy_from(&particle, &mut dot);
        let captured = dot;

        particle.state.position = Vec3::ZERO;
        particle.state.hue = 0.0;

        assert_eq!(dot, captured);
        assert_eq!(dot.seed, 0.25);
        assert_eq!(dot.lifetime, 12.0);
        assert_eq!(dot.position, Vec3::new(1.0, -2.0, 3.5));
        assert_eq!(dot.rotation, Quat::from_rotation_y(0.7));
        assert_eq!(dot.opacity, 0.8);
        assert_eq!(dot.hue, 210.0);
    }

    #[test]
    fn test_default_is_empty() {
        let mut dot = Dot::default();
        assert!(dot.is_empty());
        dot.opacity = 1.0;
        assert!(!dot.is_empty());
        dot.mark_empty();
        assert!(dot.is_empty());
    }
}
