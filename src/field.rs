//! The live particle population.
//!
//! A [`Field`] owns every live [`Particle`], advances them once per step and
//! reports whether the population has run out. What to do about an empty
//! field is left to the caller.
//!
//! # Step
//!
//! 1. Every live particle's behavior runs with the step delta.
//! 2. Children requested through [`Offspring`] are created from their
//!    parent's post-step state. They do not step until the next update.
//! 3. Particles that expired, or whose opacity dropped to zero, are removed.
//! 4. `closed` becomes `true` exactly when nothing is left.
//!
//! # Determinism
//!
//! Seeds come from a generator owned by the field, so two fields built with
//! the same seed and fed the same programs and deltas evolve identically.

use crate::behavior::{Behavior, Fate, Offspring};
use crate::particle::{Particle, ParticleId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Seed used by [`Field::new`].
pub const DEFAULT_FIELD_SEED: u64 = 0x5EED_D07;

/// Owner of the live particle set.
pub struct Field {
    particles: Vec<Particle>,
    offspring: Offspring,
    closed: bool,
    next_id: u64,
    rng: SmallRng,
}

impl Field {
    /// Empty field seeded with [`DEFAULT_FIELD_SEED`].
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_FIELD_SEED)
    }

    /// Empty field whose particle seeds are drawn from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            offspring: Offspring::default(),
            closed: false,
            next_id: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Advance every live particle by `delta` steps.
    pub fn update(&mut self, delta: f32) {
        for (index, particle) in self.particles.iter_mut().enumerate() {
            self.offspring.parent = index;
            let (behavior, state) = particle.parts_mut();
            if behavior.step(state, delta, &mut self.offspring) == Fate::Expired {
                particle.expired = true;
            }
        }

        let born = self.offspring.pending.len();
        for (parent, behavior) in std::mem::take(&mut self.offspring.pending) {
            let seed = self.rng.gen::<f32>();
            let state = self.particles[parent].state.offspring(seed);
            let id = self.allocate_id();
            self.particles.push(Particle::with_state(id, state, behavior));
        }

        let before = self.particles.len();
        self.particles.retain(|p| !p.expired && p.state.opacity > 0.0);

        self.closed = self.particles.is_empty();
        trace!(
            born,
            reaped = before - self.particles.len(),
            live = self.particles.len(),
            "Field updated"
        );
    }

    /// Insert a particle built by the caller.
    pub fn add(&mut self, particle: Particle) {
        self.next_id = self.next_id.max(particle.id().0.saturating_add(1));
        self.particles.push(particle);
        self.closed = false;
    }

    /// Create a particle driven by `behavior` with a fresh id and seed.
    pub fn spawn(&mut self, behavior: Box<dyn Behavior>) -> ParticleId {
        let seed = self.rng.gen::<f32>();
        let id = self.allocate_id();
        self.add(Particle::new(id, seed, behavior));
        id
    }

    /// Drop every live particle.
    ///
    /// `closed` keeps its value until the next [`update`](Self::update).
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Whether the population was empty after the most recent update.
    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live particles, in no particular order.
    pub fn particles(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Ids wrap after `u64::MAX`.
    fn allocate_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Field {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::FnBehavior;
    use crate::particle::ParticleState;

    fn expire_after(steps: u32) -> Box<dyn Behavior> {
        let mut left = steps;
        Box::new(FnBehavior(move |_: &mut ParticleState, _: f32, _: &mut Offspring| {
            if left <= 1 {
                Fate::Expired
            } else {
                left -= 1;
                Fate::Alive
            }
        }))
    }

    fn drift() -> Box<dyn Behavior> {
        Box::new(FnBehavior(|state: &mut ParticleState, delta: f32, _: &mut Offspring| {
            state.lifetime += delta;
            state.position.x += state.seed * delta;
            Fate::Alive
        }))
    }

    #[test]
    fn test_new_field_is_open() {
        let field = Field::new();
        assert!(!field.closed());
        assert!(field.is_empty());
    }

    #[test]
    fn test_closes_when_last_particle_expires() {
        let mut field = Field::new();
        field.spawn(expire_after(2));

        field.update(1.0);
        assert!(!field.closed());
        assert_eq!(field.len(), 1);

        field.update(1.0);
        assert!(field.closed());
        assert!(field.is_empty());

        field.spawn(drift());
        assert!(!field.closed());
    }

    #[test]
    fn test_zero_opacity_is_reaped() {
        let mut field = Field::new();
        field.spawn(Box::new(FnBehavior(
            |state: &mut ParticleState, _: f32, _: &mut Offspring| {
                state.opacity -= 0.5;
                Fate::Alive
            },
        )));

        field.update(1.0);
        assert_eq!(field.len(), 1);
        field.update(1.0);
        assert!(field.closed());
    }

    #[test]
    fn test_offspring_join_after_update() {
        let mut field = Field::new();
        field.spawn(Box::new(FnBehavior(
            |state: &mut ParticleState, _: f32, offspring: &mut Offspring| {
                state.position.y = 5.0;
                state.lifetime += 1.0;
                offspring.push(drift());
                Fate::Expired
            },
        )));

        field.update(1.0);
        assert_eq!(field.len(), 1);
        assert!(!field.closed());

        let child = field.particles().next().map(|p| p.state);
        let child = child.unwrap_or_default();
        // Inherits placement, not age, and has not stepped yet.
        assert_eq!(child.position.y, 5.0);
        assert_eq!(child.position.x, 0.0);
        assert_eq!(child.lifetime, 0.0);
        assert_eq!(child.opacity, 1.0);
    }

    #[test]
    fn test_clear_keeps_closed_until_update() {
        let mut field = Field::new();
        field.spawn(drift());
        field.update(1.0);
        field.clear();
        assert!(!field.closed());
        field.update(1.0);
        assert!(field.closed());
    }

    #[test]
    fn test_same_seed_same_trajectories() {
        let run = |seed: u64| {
            let mut field = Field::with_seed(seed);
            for _ in 0..4 {
                field.spawn(drift());
            }
            for _ in 0..10 {
                field.update(0.25);
            }
            field.particles().map(|p| p.state.position.x).collect::<Vec<_>>()
        };

        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut field = Field::new();
        let a = field.spawn(drift());
        let b = field.spawn(drift());
        assert_ne!(a, b);

        field.add(Particle::new(ParticleId(40), 0.5, drift()));
        let c = field.spawn(drift());
        assert_eq!(c, ParticleId(41));
    }

    #[test]
    fn test_largest_id_does_not_overflow() {
        let mut field = Field::new();
        field.add(Particle::new(ParticleId(u64::MAX), 0.5, drift()));
        assert_eq!(field.spawn(drift()), ParticleId(u64::MAX));
        assert_eq!(field.spawn(drift()), ParticleId(0));
        field.update(1.0);
        assert_eq!(field.len(), 3);
    }
}
