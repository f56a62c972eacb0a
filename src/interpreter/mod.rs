//! The seam to the external script interpreter.
//!
//! The engine never parses or evaluates scripts itself; it drives an
//! implementation of [`StoryInterpreter`] — advancing it in bounded
//! increments, applying choices, binding external functions, and consuming
//! its variable-change feed. Anything that compiles and runs the script
//! lives behind this trait.

/// Structured value handling for script variables and external functions.
pub mod value;

pub use value::{RawValue, ScriptValue};

use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::commands::CommandError;
use crate::engine::StoryStep;

/// Convenience result alias for interpreter operations.
pub type InterpreterResult<T> = std::result::Result<T, InterpreterError>;

/// Errors surfaced by a [`StoryInterpreter`] implementation.
#[derive(Debug, Error)]
pub enum InterpreterError {
    /// A choice index was applied that the current step does not offer.
    #[error("invalid choice index {0}")]
    InvalidChoice(usize),

    /// A named flow is unknown to the interpreter.
    #[error("unknown flow '{0}'")]
    UnknownFlow(String),

    /// An external function name was bound twice.
    #[error("external function '{0}' is already bound")]
    AlreadyBound(String),

    /// A bound external function failed while the script was calling it.
    #[error("external function error: {0}")]
    ExternalFunction(#[from] CommandError),

    /// Script-level execution error reported by the interpreter.
    #[error("script error: {0}")]
    Script(String),
}

/// Progress report from one bounded continue increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueProgress {
    /// The step finished producing; a snapshot is available.
    Done,
    /// More work remains; call again after yielding to the host.
    Pending,
}

/// A change notification from the interpreter's single variable feed.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableChange {
    /// Name of the variable that changed.
    pub name: String,
    /// The new interpreter-native value.
    pub value: RawValue,
}

/// A synchronous hook callable from script expressions.
///
/// Bound once at engine construction. The call happens while the interpreter
/// is mid-expression, so it must resolve without suspending; the engine's
/// bridge enforces that.
pub type ExternalFunction =
    Box<dyn FnMut(Vec<ScriptValue>) -> Result<Option<ScriptValue>, CommandError> + Send>;

/// The external script interpreter the engine drives.
///
/// The engine is the only caller of the mutating methods, and calls them from
/// a single task; implementations do not need interior synchronization.
pub trait StoryInterpreter: Send + 'static {
    /// Run one increment of the current continue, spending at most `budget`
    /// of wall time before returning.
    fn continue_increment(
        &mut self,
        budget: Duration,
    ) -> InterpreterResult<ContinueProgress>;

    /// Snapshot the current pause point.
    fn current_step(&self) -> StoryStep;

    /// Apply a choice by index, optionally on a named flow.
    fn choose(&mut self, index: usize, flow: Option<&str>) -> InterpreterResult<()>;

    /// Switch the active flow; `None` selects the default flow.
    fn switch_flow(&mut self, flow: Option<&str>) -> InterpreterResult<()>;

    /// Bind a synchronous external function under `name`.
    fn bind_external_function(
        &mut self,
        name: &str,
        function: ExternalFunction,
    ) -> InterpreterResult<()>;

    /// Names of all global variables currently known to the interpreter.
    fn variable_names(&self) -> Vec<String>;

    /// Current value of a variable, if it exists.
    fn variable_value(&self, name: &str) -> Option<RawValue>;

    /// Take the single variable-change feed. Called exactly once, at engine
    /// construction; subsequent calls may return an empty receiver.
    fn take_variable_changes(&mut self) -> mpsc::UnboundedReceiver<VariableChange>;
}
