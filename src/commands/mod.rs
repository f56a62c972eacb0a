//! Command discovery and execution plumbing.
//!
//! Commands are side-effecting hooks attached to narrative steps. Discovery
//! strategies ([`CommandParser`]) scan a step for invocations; handlers
//! ([`CommandProcessor`]) execute them against an isolated context and may
//! request a follow-up action (continue the story, take a choice) or, for
//! script-bound external functions, produce a return value.

/// Command invocation data: name plus named/positional parameters.
pub mod invocation;
/// The default line-prefix discovery strategy.
pub mod line;
/// Discovery strategy trait and parse context.
pub mod parser;
/// Handler trait, execution context, and the command registry.
pub mod processor;
/// The default tag discovery strategy.
pub mod tag;

pub use invocation::CommandInvocation;
pub use line::LineCommandParser;
pub use parser::{CommandParser, ParseContext};
pub use processor::{CommandContext, CommandProcessor, CommandRegistry};
pub use tag::TagCommandParser;

use thiserror::Error;

/// Convenience result alias for command operations.
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Errors surfaced while resolving, inspecting, or executing commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A discovered invocation named a command missing from the registry.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Two handlers were registered under the same name.
    #[error("duplicate command '{0}'")]
    DuplicateCommand(String),

    /// A named parameter lookup failed.
    #[error("cannot find parameter: {0}")]
    MissingNamed(String),

    /// A positional parameter lookup failed.
    #[error("cannot find positional parameter: {0}")]
    MissingPositional(usize),

    /// A script-bound external function suspended instead of resolving
    /// synchronously.
    #[error("external function '{0}' cannot suspend")]
    ExternalFunctionSuspended(String),

    /// A handler reported a failure of its own.
    #[error("command '{command}' failed: {message}")]
    Failed {
        /// Name of the failing command.
        command: String,
        /// Handler-provided description.
        message: String,
    },
}
