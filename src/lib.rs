//! # dotrail - Particle Trails From Recorded History
//!
//! Runs a population of programmable particles and draws each one as a trail
//! sampled from the last few hundred frames of its own history.
//!
//! dotrail keeps the simulation, the recorded history and the trail geometry
//! separate, so a renderer only ever has to upload two flat instance buffers.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dotrail::prelude::*;
//!
//! let config = SessionConfig::default();
//! let mut session = Session::new(PresetCompiler::new(), &config)?;
//! let mut time = Time::new(config.steps_per_second);
//!
//! loop {
//!     session.tick(time.update());
//!     upload(session.points().as_bytes(), session.shapes().as_bytes());
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles and Behaviors
//!
//! A [`Particle`] is plain state plus a boxed [`Behavior`]. Each step the
//! behavior mutates the state and either stays alive or expires. Behaviors
//! may request children through [`Offspring`]; children start from their
//! parent's post-step state.
//!
//! ### Programs
//!
//! A [`Compiler`] turns source text into a [`Program`], which hands out a
//! fresh behavior per particle. The bundled [`PresetCompiler`] accepts JSON
//! emitter descriptions and can generate random ones:
//!
//! ```ignore
//! session.apply_source(r#"{ "emitter": { "kind": "sphere", "center": [0, 0, 0], "radius": 2, "speed": 0.1 }, "rate": 6 }"#, true)?;
//! ```
//!
//! ### History
//!
//! [`History`] is a ring of fixed-size frames. Offset `0` is the newest
//! frame; offsets past what has been recorded read as empty.
//!
//! ### Trails
//!
//! [`TrailRenderer`] walks history once per rebuild and fills a point batch
//! and a shape batch. Trail length, hue drift, diffusion and attenuation are
//! controlled by [`PointTrailOptions`] and [`ShapeTrailOptions`].
//!
//! ## Frame Order
//!
//! | Phase | Runs when | Effect |
//! |-------|-----------|--------|
//! | Step | not paused | field update, history commit, geometry marked stale |
//! | Refill | field closed | optional generation, one new particle |
//! | Rebuild | geometry stale | both batches rebuilt from history |

pub mod batch;
pub mod behavior;
pub mod config;
pub mod curve;
pub mod dot;
pub mod emitter;
pub mod error;
pub mod field;
pub mod history;
pub mod lifecycle;
pub mod particle;
pub mod preset;
pub mod session;
pub mod spawn;
pub mod time;
pub mod trail;

pub use batch::{BatchStats, InstanceBatch, PointInstance, ShapeInstance};
pub use behavior::{Behavior, Compiler, Fate, FnBehavior, Offspring, Program};
pub use bytemuck;
pub use config::SessionConfig;
pub use curve::Curve;
pub use dot::Dot;
pub use emitter::Emitter;
pub use error::{ConfigError, ProgramError};
pub use field::Field;
pub use glam::{Quat, Vec3, Vec4};
pub use history::{History, Record, Snapshot};
pub use lifecycle::Lifecycle;
pub use particle::{Particle, ParticleId, ParticleState};
pub use preset::{PresetCompiler, PresetProgram, PresetSource};
pub use session::{Session, TickReport};
pub use spawn::SpawnContext;
pub use time::Time;
pub use trail::{PointTrailOptions, RebuildStats, ShapeTrailOptions, TrailRenderer};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use dotrail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::behavior::{Behavior, Compiler, Fate, FnBehavior, Offspring, Program};
    pub use crate::config::SessionConfig;
    pub use crate::curve::Curve;
    pub use crate::emitter::Emitter;
    pub use crate::error::ProgramError;
    pub use crate::lifecycle::Lifecycle;
    pub use crate::particle::ParticleState;
    pub use crate::preset::{PresetCompiler, PresetSource};
    pub use crate::session::Session;
    pub use crate::time::Time;
    pub use crate::trail::{PointTrailOptions, ShapeTrailOptions};
    pub use crate::{Quat, Vec3, Vec4};
}
