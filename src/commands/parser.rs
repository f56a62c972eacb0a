//! Discovery strategy seam.

use crate::engine::StoryStep;

use super::CommandInvocation;

/// Everything a discovery strategy may look at when scanning one step.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// The step being scanned.
    pub step: &'a StoryStep,
    /// Names of all registered commands; strategies that match free-form
    /// input (like tags) filter against this set.
    pub known_commands: &'a [String],
}

/// A discovery strategy: scans one step and emits the command invocations it
/// finds. Strategies are pure — no side effects, no suspension — and several
/// may run over the same step; their results are concatenated.
pub trait CommandParser: Send + Sync {
    /// Scan the step and return every invocation found.
    fn parse(&self, context: &ParseContext<'_>) -> Vec<CommandInvocation<String>>;
}
