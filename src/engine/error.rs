//! Error types for the engine.
//!
//! Domain errors use thiserror, with conversions collected at the engine
//! boundary. Every error aborts only the in-flight action: previously
//! emitted steps and previously committed interpreter state stay valid, and
//! nothing is retried automatically.

use thiserror::Error;

use crate::commands::CommandError;
use crate::interpreter::InterpreterError;

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Command resolution or execution failed.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Commands requested incompatible follow-ups for one step.
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Variable stream lookup failed.
    #[error("variable error: {0}")]
    Variable(#[from] VariableError),

    /// The interpreter reported an error.
    #[error("interpreter error: {0}")]
    Interpreter(#[from] InterpreterError),

    /// The in-flight action was cancelled.
    #[error("story action was cancelled")]
    Cancelled,

    /// The engine has shut down and accepts no further actions.
    #[error("engine is stopped")]
    Stopped,
}

/// Convenience result alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Conflicts between the follow-ups commands requested for one step.
///
/// Each variant names the offending command(s).
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A choice was requested on a step that offers none.
    #[error("commands asked to take a choice when there is no choice: {}", commands.join(", "))]
    ChoiceWithoutChoices {
        /// Commands that requested a choice.
        commands: Vec<String>,
    },

    /// A continue was requested while a choice is pending.
    #[error("commands asked to continue when there is a choice: {}", commands.join(", "))]
    ContinueWithPendingChoice {
        /// Commands that requested a continue.
        commands: Vec<String>,
    },

    /// More than one command selected a choice.
    #[error("multiple commands tried to select the choice to take: {}", commands.join(", "))]
    ConflictingChoices {
        /// Commands that selected a choice.
        commands: Vec<String>,
    },
}

/// Variable hub lookup errors.
#[derive(Debug, Error)]
pub enum VariableError {
    /// The named variable was never initialized into the observed set.
    #[error("variable '{0}' is not observed")]
    Unknown(String),
}
