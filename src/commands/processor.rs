//! Command handlers and the context they execute in.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::action::{FollowUpAction, FollowUpKind};
use crate::engine::Cancellation;
use crate::engine::StoryStep;
use crate::interpreter::ScriptValue;

use super::{CommandError, CommandInvocation, CommandResult};

/// A handler that executes commands discovered under its name.
///
/// `V` is the parameter value type of the invocations it receives: `String`
/// for line/tag commands, [`ScriptValue`] for handlers that can also be
/// bound as script-callable external functions.
#[async_trait]
pub trait CommandProcessor<V = String>: Send + Sync {
    /// Name this handler is registered under.
    fn name(&self) -> &str;

    /// Whether this handler should also be bound into the interpreter as a
    /// callable external function. Only `ScriptValue`-typed handlers can be.
    fn register_as_external_function(&self) -> bool {
        false
    }

    /// Execute one invocation.
    ///
    /// The context starts with a `DoNothing` follow-up; the handler may set
    /// one follow-up (continue, or take a choice) and, for value-returning
    /// handlers, one result. Execution may suspend — other commands on the
    /// same step keep running concurrently — and should abandon its work
    /// promptly once `cancel` fires.
    async fn execute(
        &self,
        invocation: CommandInvocation<V>,
        context: &mut CommandContext,
        cancel: Cancellation,
    ) -> CommandResult<()>;
}

/// Per-invocation execution context.
///
/// Single-writer: only the command being executed touches it. Holds the step
/// the command was discovered on, the follow-up request (defaults to
/// "do nothing"), and an at-most-once result slot for value-returning
/// handlers.
pub struct CommandContext {
    command: String,
    step: Arc<StoryStep>,
    follow_up: FollowUpKind,
    follow_up_set: bool,
    result: Option<ScriptValue>,
}

impl CommandContext {
    pub(crate) fn new(command: impl Into<String>, step: Arc<StoryStep>) -> Self {
        Self {
            command: command.into(),
            step,
            follow_up: FollowUpKind::DoNothing,
            follow_up_set: false,
            result: None,
        }
    }

    /// The step this command was discovered on.
    pub fn step(&self) -> &StoryStep {
        &self.step
    }

    /// Request that the story continues past this step after all commands
    /// complete.
    pub fn continue_story(&mut self) {
        self.set_follow_up(FollowUpKind::Continue);
    }

    /// Request that the given choice is taken after all commands complete.
    pub fn take_choice(&mut self, index: usize) {
        self.set_follow_up(FollowUpKind::Choice(index));
    }

    /// Set the result value returned to the script when this handler is
    /// called as an external function.
    pub fn set_result(&mut self, value: impl Into<ScriptValue>) {
        debug_assert!(self.result.is_none(), "result set more than once");
        self.result = Some(value.into());
    }

    /// The result value, if one was set.
    pub fn result(&self) -> Option<&ScriptValue> {
        self.result.as_ref()
    }

    fn set_follow_up(&mut self, kind: FollowUpKind) {
        debug_assert!(!self.follow_up_set, "follow-up set more than once");
        self.follow_up = kind;
        self.follow_up_set = true;
    }

    pub(crate) fn into_follow_up(self) -> FollowUpAction {
        FollowUpAction {
            command: self.command,
            kind: self.follow_up,
        }
    }

    pub(crate) fn take_result(&mut self) -> Option<ScriptValue> {
        self.result.take()
    }
}

/// Name-indexed registry of line/tag command handlers, built once at engine
/// construction.
pub struct CommandRegistry {
    by_name: HashMap<String, Arc<dyn CommandProcessor<String>>>,
    names: Vec<String>,
}

impl CommandRegistry {
    /// Build a registry from handlers. Duplicate names are a configuration
    /// error.
    pub fn new(
        processors: impl IntoIterator<Item = Arc<dyn CommandProcessor<String>>>,
    ) -> CommandResult<Self> {
        let mut by_name = HashMap::new();
        let mut names = Vec::new();
        for processor in processors {
            let name = processor.name().to_string();
            if by_name.insert(name.clone(), processor).is_some() {
                return Err(CommandError::DuplicateCommand(name));
            }
            names.push(name);
        }
        Ok(Self { by_name, names })
    }

    /// Names of every registered command.
    pub fn known_names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a handler by name. An invocation naming an unregistered
    /// command is a configuration error.
    pub fn resolve(&self, name: &str) -> CommandResult<Arc<dyn CommandProcessor<String>>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))
    }
}
