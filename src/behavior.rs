//! Capability interfaces for particle behaviors and the programs that make them.
//!
//! The simulation core never looks inside a behavior. It only knows that a
//! compiled [`Program`] can be invoked with a numeric signal to produce a
//! [`Behavior`], and that a behavior advances one particle's
//! [`ParticleState`] per step. Native closures, interpreted bytecode or a
//! tagged instruction set can all live behind these traits.
//!
//! Behaviors must be deterministic given the particle's `seed` and the
//! sequence of step deltas; they should not read any other mutable source of
//! randomness.

use crate::error::ProgramError;
use crate::particle::ParticleState;

/// Outcome of one behavior step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    Alive,
    Expired,
}

/// Per-particle state transition logic.
pub trait Behavior {
    /// Advance `state` by `delta` steps.
    ///
    /// Children pushed into `offspring` join the field once the current
    /// update finishes, starting from this particle's post-step state.
    fn step(&mut self, state: &mut ParticleState, delta: f32, offspring: &mut Offspring) -> Fate;
}

/// Adapts a closure into a [`Behavior`].
///
/// ```ignore
/// let drift = FnBehavior(|state: &mut ParticleState, delta: f32, _: &mut Offspring| {
///     state.position.x += delta;
///     Fate::Alive
/// });
/// ```
pub struct FnBehavior<F>(pub F);

impl<F> Behavior for FnBehavior<F>
where
    F: FnMut(&mut ParticleState, f32, &mut Offspring) -> Fate,
{
    fn step(&mut self, state: &mut ParticleState, delta: f32, offspring: &mut Offspring) -> Fate {
        (self.0)(state, delta, offspring)
    }
}

/// Children requested during one field update.
///
/// Owned by the [`Field`](crate::field::Field) and reused between updates.
#[derive(Default)]
pub struct Offspring {
    pub(crate) pending: Vec<(usize, Box<dyn Behavior>)>,
    pub(crate) parent: usize,
}

impl Offspring {
    /// Queue a child of the particle currently stepping.
    pub fn push(&mut self, behavior: Box<dyn Behavior>) {
        self.pending.push((self.parent, behavior));
    }

    /// Children queued so far in this update.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// A compiled program: a factory of behaviors.
pub trait Program {
    /// Produce a behavior for a new particle under this program.
    ///
    /// `signal` is a small numeric vector chosen by the caller; programs
    /// must tolerate it being shorter than they expect.
    fn instantiate(&self, signal: &[f32]) -> Box<dyn Behavior>;
}

impl<F> Program for F
where
    F: Fn(&[f32]) -> Box<dyn Behavior>,
{
    fn instantiate(&self, signal: &[f32]) -> Box<dyn Behavior> {
        self(signal)
    }
}

/// Front end that turns source text into a [`Program`].
///
/// Failures are reported as classified [`ProgramError`]s: `parse` returns
/// [`ProgramError::Parse`], `compile` returns [`ProgramError::Compile`].
pub trait Compiler {
    /// Parsed, not yet validated program.
    type Ast;

    fn parse(&self, source: &str) -> Result<Self::Ast, ProgramError>;

    fn compile(&self, ast: &Self::Ast) -> Result<Box<dyn Program>, ProgramError>;

    /// Randomly generate a program. Higher `strength` yields busier patterns.
    fn generate(&mut self, strength: f32) -> Self::Ast;

    /// Render a program back to source text.
    fn print(&self, ast: &Self::Ast) -> String;
}
