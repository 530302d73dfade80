//! Emission shapes for preset programs.
//!
//! An emitter decides where a spawned particle starts relative to its parent
//! and which way it flies. Every draw goes through the child's own
//! [`SpawnContext`], so a particle's launch is fixed by its seed.
//!
//! # Emitter Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Emitter::Point`] | Single point, omnidirectional |
//! | [`Emitter::Cone`] | Directional cone emission |
//! | [`Emitter::Sphere`] | Spawn on a sphere surface, flying outward |
//! | [`Emitter::Ring`] | Spawn on a ring in the XZ plane, flying outward |
//!
//! Speeds are in distance units per simulation step.

use crate::spawn::SpawnContext;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Particle emission shape.
///
/// # Example
///
/// ```ignore
/// // Fountain shooting upward
/// Emitter::Cone {
///     position: Vec3::new(0.0, -10.0, 0.0),
///     direction: Vec3::Y,
///     speed: 0.6,
///     spread: 0.3,
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Emitter {
    /// Emit from a single point in random directions.
    Point {
        /// Spawn position.
        position: Vec3,
        /// Initial speed of particles.
        speed: f32,
    },

    /// Directional cone emitter, for fountains and jets.
    Cone {
        /// Spawn position.
        position: Vec3,
        /// Primary emission direction.
        direction: Vec3,
        /// Initial speed of particles.
        speed: f32,
        /// Cone half-angle in radians.
        spread: f32,
    },

    /// Spawn on a sphere surface and move outward (inward if speed < 0).
    Sphere {
        center: Vec3,
        radius: f32,
        speed: f32,
    },

    /// Spawn on a horizontal ring and move outward (inward if speed < 0).
    Ring {
        center: Vec3,
        radius: f32,
        speed: f32,
    },
}

impl Emitter {
    /// Where the emitting particle sits.
    pub fn origin(&self) -> Vec3 {
        match self {
            Emitter::Point { position, .. } | Emitter::Cone { position, .. } => *position,
            Emitter::Sphere { center, .. } | Emitter::Ring { center, .. } => *center,
        }
    }

    /// Draw a start offset (relative to [`origin`](Self::origin)) and a velocity.
    pub fn launch(&self, ctx: &mut SpawnContext) -> (Vec3, Vec3) {
        match self {
            Emitter::Point { speed, .. } => (Vec3::ZERO, ctx.random_direction() * *speed),
            Emitter::Cone {
                direction,
                speed,
                spread,
                ..
            } => (Vec3::ZERO, ctx.random_in_cone(*direction, *spread) * *speed),
            Emitter::Sphere { radius, speed, .. } => {
                let dir = ctx.random_direction();
                (dir * *radius, dir * *speed)
            }
            Emitter::Ring { radius, speed, .. } => {
                let offset = ctx.random_on_ring(1.0);
                (offset * *radius, offset * *speed)
            }
        }
    }

    /// Check that every parameter is usable.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let finite = |v: Vec3| v.is_finite();
        match self {
            Emitter::Point { position, speed } => {
                if !finite(*position) || !speed.is_finite() {
                    return Err("point emitter has a non-finite parameter".into());
                }
            }
            Emitter::Cone {
                position,
                direction,
                speed,
                spread,
            } => {
                if !finite(*position) || !finite(*direction) || !speed.is_finite() {
                    return Err("cone emitter has a non-finite parameter".into());
                }
                if direction.length_squared() == 0.0 {
                    return Err("cone emitter direction must be non-zero".into());
                }
                if !spread.is_finite() || *spread < 0.0 {
                    return Err(format!("cone spread must be non-negative, got {spread}"));
                }
            }
            Emitter::Sphere { center, radius, speed } | Emitter::Ring { center, radius, speed } => {
                if !finite(*center) || !speed.is_finite() {
                    return Err("emitter has a non-finite parameter".into());
                }
                if !radius.is_finite() || *radius < 0.0 {
                    return Err(format!("emitter radius must be non-negative, got {radius}"));
                }
            }
        }
        Ok(())
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::Point {
            position: Vec3::ZERO,
            speed: 0.2,
        }
    }
}
