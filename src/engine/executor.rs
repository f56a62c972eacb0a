//! Concurrent command execution for one step.

use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

use crate::commands::processor::{CommandContext, CommandProcessor, CommandRegistry};
use crate::commands::{CommandError, CommandInvocation, CommandParser, ParseContext};
use crate::interpreter::{ExternalFunction, ScriptValue};

use super::cancel::Cancellation;
use super::error::EngineResult;
use super::reconcile::FollowUpGroups;
use super::step::StoryStep;

/// Discovers the commands attached to a step and runs them concurrently,
/// each against its own fresh context.
pub(crate) struct CommandExecutor {
    registry: CommandRegistry,
    parsers: Vec<Box<dyn CommandParser>>,
}

impl CommandExecutor {
    pub(crate) fn new(registry: CommandRegistry, parsers: Vec<Box<dyn CommandParser>>) -> Self {
        Self { registry, parsers }
    }

    /// Run every discovery strategy over the step and concatenate the
    /// results. Discovery order does not constrain execution order.
    pub(crate) fn discover(&self, step: &StoryStep) -> Vec<CommandInvocation<String>> {
        let context = ParseContext {
            step,
            known_commands: self.registry.known_names(),
        };
        self.parsers
            .iter()
            .flat_map(|parser| parser.parse(&context))
            .collect()
    }

    /// Execute all invocations for a step as an unordered fan-out, wait for
    /// every one to finish, and return the surviving follow-up requests
    /// partitioned by kind.
    ///
    /// Most steps carry no commands; those short-circuit without touching
    /// the scheduler. Resolving an unknown command name fails before
    /// anything runs.
    pub(crate) async fn execute(
        &self,
        invocations: Vec<CommandInvocation<String>>,
        step: &Arc<StoryStep>,
        cancel: &Cancellation,
    ) -> EngineResult<FollowUpGroups> {
        let mut groups = FollowUpGroups::default();
        if invocations.is_empty() {
            return Ok(groups);
        }

        let mut pending = FuturesUnordered::new();
        for invocation in invocations {
            let processor = self.registry.resolve(invocation.name())?;
            let step = Arc::clone(step);
            let cancel = cancel.clone();
            pending.push(async move {
                let mut context = CommandContext::new(processor.name(), step);
                processor.execute(invocation, &mut context, cancel).await?;
                Ok::<_, CommandError>(context.into_follow_up())
            });
        }

        tracing::debug!(commands = pending.len(), "executing step commands");
        while let Some(finished) = pending.next().await {
            groups.push(finished?);
        }
        Ok(groups)
    }
}

/// Wrap a value-typed handler as a synchronous hook callable from script
/// expressions.
///
/// The interpreter's calling convention is synchronous and the bridge is not
/// reentrant, so the handler's future is polled exactly once: if it is still
/// pending, the call fails rather than block or defer. The handler's result
/// value (if set) becomes the function's return value to the script.
pub(crate) fn external_function_bridge(
    processor: Arc<dyn CommandProcessor<ScriptValue>>,
) -> ExternalFunction {
    Box::new(move |args: Vec<ScriptValue>| {
        let invocation = CommandInvocation::positional(processor.name(), args);
        let mut context = CommandContext::new(processor.name(), Arc::new(StoryStep::default()));
        match processor
            .execute(invocation, &mut context, Cancellation::never())
            .now_or_never()
        {
            Some(outcome) => {
                outcome?;
                Ok(context.take_result())
            }
            None => Err(CommandError::ExternalFunctionSuspended(
                processor.name().to_string(),
            )),
        }
    })
}
