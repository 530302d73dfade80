//! Particle lifecycle settings for preset programs.
//!
//! A [`Lifecycle`] describes how an emitted particle ages: how long it lives,
//! whether it fades, how its hue drifts and how fast it spins. Age is counted
//! in simulation steps.
//!
//! ```ignore
//! let lifecycle = Lifecycle::new()
//!     .lifetime_range(40.0..90.0) // Drawn per particle from its seed
//!     .fade_out()                 // Opacity falls to zero at death
//!     .hue_over_life(30.0, 0.0)   // Orange at birth, red at death
//!     .spin(0.05);
//! ```

use crate::particle::ParticleState;
use crate::spawn::SpawnContext;
use glam::Quat;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Lifecycle configuration builder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifecycle {
    /// Shortest lifetime in steps.
    pub lifetime_min: f32,
    /// Longest lifetime in steps. Equal to `lifetime_min` for a fixed lifetime.
    pub lifetime_max: f32,
    /// Whether opacity falls linearly to zero over the lifetime.
    pub fade_out: bool,
    /// Hue in degrees at birth and at death.
    pub hue_over_life: Option<(f32, f32)>,
    /// Rotation about the particle's local Y axis, radians per step.
    pub spin: f32,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            lifetime_min: 60.0,
            lifetime_max: 60.0,
            fade_out: true,
            hue_over_life: None,
            spin: 0.0,
        }
    }
}

impl Lifecycle {
    /// Create a new lifecycle with the default fixed lifetime and fade-out.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Set a fixed lifetime for all particles.
    pub fn lifetime(mut self, steps: f32) -> Self {
        self.lifetime_min = steps;
        self.lifetime_max = steps;
        self
    }

    /// Set a random lifetime range. Each particle draws its lifetime from its seed.
    pub fn lifetime_range(mut self, range: Range<f32>) -> Self {
        self.lifetime_min = range.start;
        self.lifetime_max = range.end;
        self
    }

    /// Enable fade out effect.
    pub fn fade_out(mut self) -> Self {
        self.fade_out = true;
        self
    }

    /// Keep particles fully opaque until they expire.
    pub fn no_fade(mut self) -> Self {
        self.fade_out = false;
        self
    }

    /// Set hue gradient over lifetime, in degrees.
    pub fn hue_over_life(mut self, start: f32, end: f32) -> Self {
        self.hue_over_life = Some((start, end));
        self
    }

    /// Set spin rate in radians per step.
    pub fn spin(mut self, radians_per_step: f32) -> Self {
        self.spin = radians_per_step;
        self
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    /// Lifetime of one particle, drawn from its own random stream.
    pub fn draw_lifetime(&self, ctx: &mut SpawnContext) -> f32 {
        ctx.random_range(self.lifetime_min, self.lifetime_max)
    }

    /// Hue at birth, before any signal shift.
    pub fn birth_hue(&self) -> f32 {
        self.hue_over_life.map_or(0.0, |(start, _)| start)
    }

    /// Apply age-dependent appearance. Returns `true` once the particle has
    /// outlived `lifetime`.
    pub fn apply(&self, state: &mut ParticleState, lifetime: f32, hue_shift: f32, delta: f32) -> bool {
        let progress = if lifetime > 0.0 {
            (state.lifetime / lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        };

        if self.fade_out {
            state.opacity = 1.0 - progress;
        }
        if let Some((start, end)) = self.hue_over_life {
            state.hue = start + (end - start) * progress + hue_shift;
        }
        if self.spin != 0.0 {
            state.rotation = (state.rotation * Quat::from_rotation_y(self.spin * delta)).normalize();
        }

        state.lifetime >= lifetime
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.lifetime_min.is_finite() || !self.lifetime_max.is_finite() {
            return Err("lifetime must be finite".into());
        }
        if self.lifetime_min <= 0.0 {
            return Err(format!("lifetime must be positive, got {}", self.lifetime_min));
        }
        if self.lifetime_max < self.lifetime_min {
            return Err(format!(
                "lifetime range is inverted: {}..{}",
                self.lifetime_min, self.lifetime_max
            ));
        }
        if !self.spin.is_finite() {
            return Err("spin must be finite".into());
        }
        if let Some((start, end)) = self.hue_over_life {
            if !start.is_finite() || !end.is_finite() {
                return Err("hue over life must be finite".into());
            }
        }
        Ok(())
    }
}
