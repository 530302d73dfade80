//! The per-frame driver tying field, history and trails together.
//!
//! A [`Session`] runs the full frame chain in a fixed order:
//!
//! 1. Unless paused, the field advances, the history records the result and
//!    the trail geometry is marked stale. If the field ran empty, a new
//!    pattern is optionally generated and one particle of the current
//!    program is spawned.
//! 2. If the geometry is stale, both trail batches are rebuilt from history.
//!
//! While paused nothing is recorded, but a rebuild that was already pending
//! still happens, so trails keep rendering from frozen history.
//!
//! Program changes are atomic: a source that fails to parse or compile
//! leaves the running program untouched and only updates the notification.

use crate::batch::{InstanceBatch, PointInstance, ShapeInstance};
use crate::behavior::{Compiler, Program};
use crate::config::SessionConfig;
use crate::dot::Dot;
use crate::error::ProgramError;
use crate::field::Field;
use crate::history::History;
use crate::trail::{PointTrailOptions, RebuildStats, ShapeTrailOptions, TrailRenderer};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Signal passed to the program for every particle the session spawns.
pub const SPAWN_SIGNAL: [f32; 2] = [0.0, 1.0];

/// What one [`Session::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// The simulation advanced and a frame was recorded.
    pub stepped: bool,
    /// Trail geometry was rebuilt.
    pub rebuilt: Option<RebuildStats>,
    /// The field was empty after the step.
    pub closed: bool,
    /// Live particles after the tick.
    pub live: usize,
}

/// Application-level owner of one running simulation.
pub struct Session<C: Compiler> {
    compiler: C,
    program: Box<dyn Program>,
    field: Field,
    history: History<Dot>,
    trails: TrailRenderer,
    state_needs_update: bool,
    paused: bool,
    generate_automatically: bool,
    generator_strength: f32,
    generation_count: u64,
    editing_item: String,
    editing_code: String,
    notification: Option<String>,
}

impl<C: Compiler> Session<C> {
    /// Build a session and compile `config.initial_source`.
    pub fn new(compiler: C, config: &SessionConfig) -> Result<Self, ProgramError> {
        let program = compile_source(&compiler, &config.initial_source)?;

        let mut trails = TrailRenderer::with_capacity(config.batch_capacity);
        trails.point_options = config.points.clone();
        trails.shape_options = config.shapes.clone();

        info!(
            history = config.history_capacity,
            particles = config.particle_capacity,
            batch = config.batch_capacity,
            "Session created"
        );

        Ok(Self {
            compiler,
            program,
            field: Field::with_seed(config.seed),
            history: History::new(
                Dot::default,
                config.history_capacity.max(1),
                config.particle_capacity,
            ),
            trails,
            state_needs_update: false,
            paused: false,
            generate_automatically: config.generate_automatically,
            generator_strength: config.generator_strength,
            generation_count: 0,
            editing_item: String::new(),
            editing_code: config.initial_source.clone(),
            notification: None,
        })
    }

    /// Run one frame with `delta_step` simulation steps.
    pub fn tick(&mut self, delta_step: f32) -> TickReport {
        let mut report = TickReport::default();

        if !self.paused {
            self.field.update(delta_step);
            self.history.put_snapshot(self.field.particles(), Dot::copy_from);
            self.state_needs_update = true;
            report.stepped = true;
            report.closed = self.field.closed();

            if self.field.closed() {
                // A rejected generation keeps the previous program spawning.
                if self.generate_automatically {
                    if let Err(err) = self.generate_pattern(false) {
                        debug!(kind = err.kind(), %err, "Generated pattern rejected");
                    }
                }
                let behavior = self.program.instantiate(&SPAWN_SIGNAL);
                self.field.spawn(behavior);
            }
        }

        if self.state_needs_update {
            self.state_needs_update = false;
            report.rebuilt = Some(self.trails.update_state(&self.history));
        }

        report.live = self.field.len();
        report
    }

    /// Compile `code` and make it the running program.
    ///
    /// With `clear`, particles of the previous program are removed. On
    /// failure the previous program keeps running.
    pub fn apply_source(&mut self, code: &str, clear: bool) -> Result<(), ProgramError> {
        match compile_source(&self.compiler, code) {
            Ok(program) => {
                self.program = program;
                if clear {
                    self.field.clear();
                }
                info!(clear, "Program compiled");
                self.notification = Some("Successfully compiled.".to_string());
                Ok(())
            }
            Err(err) => {
                warn!(kind = err.kind(), %err, "Program rejected");
                self.notification = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Generate a random program and apply it.
    pub fn generate_pattern(&mut self, clear: bool) -> Result<(), ProgramError> {
        self.generation_count += 1;
        let ast = self.compiler.generate(self.generator_strength);
        let code = self.compiler.print(&ast);
        self.editing_item = format!("Generation {}", self.generation_count);
        self.editing_code = code.clone();
        info!(generation = self.generation_count, "Pattern generated");
        self.apply_source(&code, clear)
    }

    /// Remove every live particle. History is kept.
    pub fn reset(&mut self) {
        debug!(live = self.field.len(), "Field reset");
        self.field.clear();
    }

    /// Force the next tick to rebuild trail geometry.
    pub fn invalidate(&mut self) {
        self.state_needs_update = true;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_generate_automatically(&mut self, enabled: bool) {
        self.generate_automatically = enabled;
    }

    pub fn set_generator_strength(&mut self, strength: f32) {
        self.generator_strength = strength;
    }

    pub fn set_point_options(&mut self, options: PointTrailOptions) {
        self.trails.point_options = options;
        self.invalidate();
    }

    pub fn set_shape_options(&mut self, options: ShapeTrailOptions) {
        self.trails.shape_options = options;
        self.invalidate();
    }

    /// Show or hide the point and shape trails.
    pub fn set_visibility(&mut self, points: bool, shapes: bool) {
        self.trails.points.visible = points;
        self.trails.shapes.visible = shapes;
        self.invalidate();
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the next tick will rebuild trail geometry.
    pub fn needs_update(&self) -> bool {
        self.state_needs_update
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Mutable field access for callers that inject particles directly.
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn history(&self) -> &History<Dot> {
        &self.history
    }

    pub fn program(&self) -> &dyn Program {
        self.program.as_ref()
    }

    pub fn points(&self) -> &InstanceBatch<PointInstance> {
        &self.trails.points
    }

    pub fn shapes(&self) -> &InstanceBatch<ShapeInstance> {
        &self.trails.shapes
    }

    pub fn point_options(&self) -> &PointTrailOptions {
        &self.trails.point_options
    }

    pub fn shape_options(&self) -> &ShapeTrailOptions {
        &self.trails.shape_options
    }

    /// Message from the last program change, for display.
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// Source of the last generated program, or the initial source.
    pub fn editing_code(&self) -> &str {
        &self.editing_code
    }

    /// Name of the last generated program.
    pub fn editing_item(&self) -> &str {
        &self.editing_item
    }

    pub fn generation_count(&self) -> u64 {
        self.generation_count
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }
}

/// Parse and compile, classifying a panicking compiler as [`ProgramError::Unknown`].
fn compile_source<C: Compiler>(compiler: &C, code: &str) -> Result<Box<dyn Program>, ProgramError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let ast = compiler.parse(code)?;
        compiler.compile(&ast)
    }))
    .unwrap_or_else(|payload| Err(ProgramError::from_panic(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::PresetCompiler;

    fn session() -> Session<PresetCompiler> {
        let config = SessionConfig {
            history_capacity: 8,
            particle_capacity: 64,
            batch_capacity: 256,
            ..SessionConfig::default()
        };
        Session::new(PresetCompiler::with_seed(5), &config).unwrap()
    }

    #[test]
    fn test_first_tick_seeds_empty_field() {
        let mut session = session();
        let report = session.tick(1.0);

        assert!(report.stepped);
        assert!(report.closed);
        assert_eq!(report.live, 1);
        assert!(report.rebuilt.is_some());
        assert_eq!(session.history().commits(), 1);
    }

    #[test]
    fn test_paused_tick_records_nothing() {
        let mut session = session();
        session.tick(1.0);
        session.set_paused(true);

        let report = session.tick(1.0);
        assert!(!report.stepped);
        assert!(report.rebuilt.is_none());
        assert_eq!(session.history().commits(), 1);
    }

    #[test]
    fn test_failed_compile_keeps_notification() {
        let mut session = session();
        let err = session.apply_source("{ oops", true).unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(session.notification().is_some_and(|n| n.starts_with("Parse error:")));

        session.apply_source(r#"{ "rate": 2 }"#, true).unwrap();
        assert_eq!(session.notification(), Some("Successfully compiled."));
    }

    #[test]
    fn test_generate_names_item() {
        let mut session = session();
        session.generate_pattern(true).unwrap();
        session.generate_pattern(true).unwrap();

        assert_eq!(session.generation_count(), 2);
        assert_eq!(session.editing_item(), "Generation 2");
        assert!(session.editing_code().contains("\"emitter\""));
    }
}
