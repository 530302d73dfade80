//! Native preset programs.
//!
//! [`PresetCompiler`] is a small [`Compiler`] whose source text is a JSON
//! [`PresetSource`]: an emitter shape, a lifecycle and a few motion
//! constants. It exists so a [`Session`](crate::session::Session) can run
//! without an external behavior language, and it follows the same contract
//! any such language must meet: parse and compile failures are classified,
//! and every random choice a particle makes is keyed by its seed.
//!
//! A bare preset name (`fire`, `fountain`, `burst`, `sparkler`) is also
//! accepted as source and stands for that preset at the origin.
//!
//! A compiled preset starts as one emitter particle. It sits at the
//! emitter's origin, spawns `rate` children per step until `count` have
//! been spawned, then expires. Children launch on their first step, age
//! through the lifecycle and expire when it runs out.
//!
//! ```ignore
//! let mut compiler = PresetCompiler::new();
//! let ast = compiler.parse(r#"{ "rate": 8, "count": 400, "emitter": { "kind": "ring", "center": [0, 0, 0], "radius": 4, "speed": 0.2 } }"#)?;
//! let program = compiler.compile(&ast)?;
//! field.spawn(program.instantiate(&[0.0, 1.0]));
//! ```

use crate::behavior::{Behavior, Compiler, Fate, Offspring, Program};
use crate::emitter::Emitter;
use crate::error::ProgramError;
use crate::lifecycle::Lifecycle;
use crate::particle::ParticleState;
use crate::spawn::SpawnContext;
use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Most children a single preset may spawn.
pub const MAX_PRESET_COUNT: u32 = 50_000;

/// Names accepted by [`PresetSource::named`].
pub const PRESET_NAMES: [&str; 4] = ["fire", "fountain", "burst", "sparkler"];

/// Stream a spark draws its lifetime from, apart from its launch.
const LIFETIME_STREAM: u64 = 1;

/// Parsed preset program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetSource {
    pub emitter: Emitter,
    pub lifecycle: Lifecycle,
    /// Children spawned per step.
    pub rate: f32,
    /// Children spawned in total.
    pub count: u32,
    /// Downward acceleration, units per step squared.
    pub gravity: f32,
    /// Fraction of velocity lost per step.
    pub drag: f32,
}

impl Default for PresetSource {
    fn default() -> Self {
        Self {
            emitter: Emitter::default(),
            lifecycle: Lifecycle::new().lifetime_range(40.0..80.0).hue_over_life(200.0, 320.0),
            rate: 4.0,
            count: 400,
            gravity: 0.0,
            drag: 0.0,
        }
    }
}

impl PresetSource {
    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Built-in preset called `name`, placed at the origin.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "fire" => Some(Self::fire(Vec3::ZERO)),
            "fountain" => Some(Self::fountain(Vec3::ZERO)),
            "burst" => Some(Self::burst(Vec3::ZERO, 500)),
            "sparkler" => Some(Self::sparkler(Vec3::ZERO)),
            _ => None,
        }
    }

    /// Rising embers that cool from yellow to red.
    pub fn fire(position: Vec3) -> Self {
        Self {
            emitter: Emitter::Cone {
                position,
                direction: Vec3::Y,
                speed: 0.15,
                spread: 0.4,
            },
            lifecycle: Lifecycle::new().lifetime_range(40.0..70.0).hue_over_life(50.0, 0.0),
            rate: 12.0,
            count: 2_000,
            gravity: -0.002,
            drag: 0.01,
        }
    }

    /// Particles arc up and fall back down.
    pub fn fountain(position: Vec3) -> Self {
        Self {
            emitter: Emitter::Cone {
                position,
                direction: Vec3::Y,
                speed: 0.6,
                spread: 0.2,
            },
            lifecycle: Lifecycle::new().lifetime(120.0).hue_over_life(200.0, 230.0),
            rate: 8.0,
            count: 1_500,
            gravity: 0.01,
            drag: 0.0,
        }
    }

    /// Everything at once, flying outward and slowing down.
    pub fn burst(position: Vec3, count: u32) -> Self {
        Self {
            emitter: Emitter::Point { position, speed: 0.5 },
            lifecycle: Lifecycle::new().lifetime_range(50.0..80.0).hue_over_life(60.0, 20.0),
            rate: count as f32,
            count,
            gravity: 0.0,
            drag: 0.04,
        }
    }

    /// Fast, short-lived sparks spraying off a sphere.
    pub fn sparkler(position: Vec3) -> Self {
        Self {
            emitter: Emitter::Sphere {
                center: position,
                radius: 0.2,
                speed: 0.8,
            },
            lifecycle: Lifecycle::new().lifetime_range(10.0..25.0).hue_over_life(40.0, 30.0),
            rate: 30.0,
            count: 3_000,
            gravity: 0.004,
            drag: 0.02,
        }
    }

    /// Check every value a compiled program depends on.
    pub fn validate(&self) -> Result<(), String> {
        self.emitter.validate()?;
        self.lifecycle.validate()?;
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(format!("rate must be positive, got {}", self.rate));
        }
        if self.count == 0 || self.count > MAX_PRESET_COUNT {
            return Err(format!(
                "count must be between 1 and {MAX_PRESET_COUNT}, got {}",
                self.count
            ));
        }
        if !self.gravity.is_finite() {
            return Err("gravity must be finite".into());
        }
        if !self.drag.is_finite() || !(0.0..=1.0).contains(&self.drag) {
            return Err(format!("drag must be within 0..=1, got {}", self.drag));
        }
        Ok(())
    }
}

/// A validated, runnable preset.
pub struct PresetProgram {
    source: Rc<PresetSource>,
}

impl PresetProgram {
    pub fn source(&self) -> &PresetSource {
        &self.source
    }
}

impl Program for PresetProgram {
    /// `signal[0] * 360` shifts every hue; `signal[1]` scales launch speed.
    fn instantiate(&self, signal: &[f32]) -> Box<dyn Behavior> {
        let hue_shift = signal.first().copied().unwrap_or(0.0) * 360.0;
        let speed_scale = signal.get(1).copied().unwrap_or(1.0);
        Box::new(EmitterRoot {
            source: Rc::clone(&self.source),
            hue_shift,
            speed_scale,
            emitted: 0,
            budget: 0.0,
            placed: false,
        })
    }
}

/// The particle a preset starts from.
struct EmitterRoot {
    source: Rc<PresetSource>,
    hue_shift: f32,
    speed_scale: f32,
    emitted: u32,
    budget: f32,
    placed: bool,
}

impl Behavior for EmitterRoot {
    fn step(&mut self, state: &mut ParticleState, delta: f32, offspring: &mut Offspring) -> Fate {
        if !self.placed {
            state.position = self.source.emitter.origin();
            state.hue = self.source.lifecycle.birth_hue() + self.hue_shift;
            self.placed = true;
        }
        state.lifetime += delta;

        self.budget += self.source.rate * delta;
        while self.budget >= 1.0 && self.emitted < self.source.count {
            offspring.push(Box::new(Spark {
                source: Rc::clone(&self.source),
                hue_shift: self.hue_shift,
                speed_scale: self.speed_scale,
                velocity: Vec3::ZERO,
                lifetime: 0.0,
                launched: false,
            }));
            self.emitted += 1;
            self.budget -= 1.0;
        }

        if self.emitted >= self.source.count {
            Fate::Expired
        } else {
            Fate::Alive
        }
    }
}

/// An emitted particle.
struct Spark {
    source: Rc<PresetSource>,
    hue_shift: f32,
    speed_scale: f32,
    velocity: Vec3,
    lifetime: f32,
    launched: bool,
}

impl Spark {
    fn launch(&mut self, state: &mut ParticleState) {
        let mut ctx = SpawnContext::new(state.seed);
        let (offset, velocity) = self.source.emitter.launch(&mut ctx);
        state.position += offset;
        self.velocity = velocity * self.speed_scale;
        let mut lifetime = SpawnContext::salted(state.seed, LIFETIME_STREAM);
        self.lifetime = self.source.lifecycle.draw_lifetime(&mut lifetime);
        if let Some(direction) = self.velocity.try_normalize() {
            state.rotation = Quat::from_rotation_arc(Vec3::Y, direction);
        }
        self.launched = true;
    }
}

impl Behavior for Spark {
    fn step(&mut self, state: &mut ParticleState, delta: f32, _offspring: &mut Offspring) -> Fate {
        if !self.launched {
            self.launch(state);
        }

        self.velocity.y -= self.source.gravity * delta;
        self.velocity *= (1.0 - self.source.drag * delta).max(0.0);
        state.position += self.velocity * delta;
        state.lifetime += delta;

        if self.source.lifecycle.apply(state, self.lifetime, self.hue_shift, delta) {
            Fate::Expired
        } else {
            Fate::Alive
        }
    }
}

/// Compiler for JSON preset sources.
pub struct PresetCompiler {
    rng: SmallRng,
}

impl PresetCompiler {
    /// Compiler whose generator is seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Compiler with a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn random_emitter(&mut self, speed: f32) -> Emitter {
        let rng = &mut self.rng;
        match rng.gen_range(0..4) {
            0 => Emitter::Point {
                position: Vec3::ZERO,
                speed,
            },
            1 => Emitter::Cone {
                position: Vec3::ZERO,
                direction: Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(0.2..1.0),
                    rng.gen_range(-1.0..1.0),
                ),
                speed,
                spread: rng.gen_range(0.1..0.8),
            },
            2 => Emitter::Sphere {
                center: Vec3::ZERO,
                radius: rng.gen_range(0.5..6.0),
                speed,
            },
            _ => Emitter::Ring {
                center: Vec3::ZERO,
                radius: rng.gen_range(1.0..10.0),
                speed,
            },
        }
    }
}

impl Default for PresetCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for PresetCompiler {
    type Ast = PresetSource;

    /// Empty source parses to the default preset, a bare name to that
    /// built-in preset.
    fn parse(&self, source: &str) -> Result<PresetSource, ProgramError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(PresetSource::default());
        }
        if let Some(preset) = PresetSource::named(trimmed) {
            return Ok(preset);
        }
        serde_json::from_str(source).map_err(|e| ProgramError::Parse(e.to_string()))
    }

    fn compile(&self, ast: &PresetSource) -> Result<Box<dyn Program>, ProgramError> {
        ast.validate().map_err(ProgramError::Compile)?;
        Ok(Box::new(PresetProgram {
            source: Rc::new(ast.clone()),
        }))
    }

    fn generate(&mut self, strength: f32) -> PresetSource {
        let strength = if strength.is_finite() { strength.clamp(0.0, 4.0) } else { 1.0 };

        let speed = self.rng.gen_range(0.05..0.3) * (0.5 + strength);
        let emitter = self.random_emitter(speed);

        let rng = &mut self.rng;
        let lifetime_min = rng.gen_range(20.0..80.0);
        let lifetime_max = lifetime_min + rng.gen_range(0.0..60.0);
        let hue = rng.gen_range(0.0..360.0);
        let lifecycle = Lifecycle::new()
            .lifetime_range(lifetime_min..lifetime_max)
            .hue_over_life(hue, hue + rng.gen_range(-180.0..180.0))
            .spin(rng.gen_range(-0.1..0.1) * strength);

        let count = (50.0 + rng.gen_range(0.0..1500.0) * strength).round() as u32;
        let gravity = if rng.gen_bool(0.5) { rng.gen_range(0.0..0.01) } else { 0.0 };

        PresetSource {
            emitter,
            lifecycle,
            rate: 1.0 + rng.gen_range(0.0..8.0) * (0.25 + strength),
            count: count.clamp(1, MAX_PRESET_COUNT),
            gravity,
            drag: rng.gen_range(0.0..0.05),
        }
    }

    fn print(&self, ast: &PresetSource) -> String {
        serde_json::to_string_pretty(ast).unwrap_or_default()
    }
}
