//! Live simulation entities.

use crate::behavior::Behavior;
use glam::{Quat, Vec3};
use std::fmt;

/// Stable identity of a particle within one [`Field`](crate::field::Field).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renderable state of a particle, mutated only by its own behavior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    /// Per-particle randomization key in `[0, 1)`.
    ///
    /// Behaviors derive all of their randomness from this value.
    pub seed: f32,
    /// Steps lived so far.
    pub lifetime: f32,
    pub position: Vec3,
    pub rotation: Quat,
    /// Opacity in `[0, 1]`. Zero or below reaps the particle.
    pub opacity: f32,
    /// Hue in degrees.
    pub hue: f32,
}

impl ParticleState {
    /// Fresh state at the origin, fully opaque.
    pub fn new(seed: f32) -> Self {
        Self {
            seed,
            lifetime: 0.0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            opacity: 1.0,
            hue: 0.0,
        }
    }

    /// State a child inherits: same placement and color, age reset.
    pub(crate) fn offspring(&self, seed: f32) -> Self {
        Self {
            seed,
            lifetime: 0.0,
            opacity: 1.0,
            ..*self
        }
    }
}

impl Default for ParticleState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A live entity driven by an opaque [`Behavior`].
pub struct Particle {
    id: ParticleId,
    pub state: ParticleState,
    behavior: Box<dyn Behavior>,
    pub(crate) expired: bool,
}

impl Particle {
    /// Create a particle with an explicit id and seed.
    ///
    /// Most callers should use [`Field::spawn`](crate::field::Field::spawn),
    /// which assigns both.
    pub fn new(id: ParticleId, seed: f32, behavior: Box<dyn Behavior>) -> Self {
        Self::with_state(id, ParticleState::new(seed), behavior)
    }

    pub fn with_state(id: ParticleId, state: ParticleState, behavior: Box<dyn Behavior>) -> Self {
        Self {
            id,
            state,
            behavior,
            expired: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Split borrow used by the field to step the behavior against the state.
    pub(crate) fn parts_mut(&mut self) -> (&mut dyn Behavior, &mut ParticleState) {
        (self.behavior.as_mut(), &mut self.state)
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
