//! Serialized processing of caller actions.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::interpreter::StoryInterpreter;

use super::cancel::Cancellation;
use super::driver::ContinuationDriver;
use super::error::{EngineError, EngineResult};
use super::executor::CommandExecutor;
use super::reconcile::{reconcile, Reconciliation};
use super::step::StoryStep;
use super::StoryAction;

/// One queued action, optionally carrying a reply slot for the caller that
/// wants the action's outcome.
pub(crate) struct Envelope {
    pub(crate) action: StoryAction,
    pub(crate) reply: Option<oneshot::Sender<EngineResult<Option<StoryStep>>>>,
}

/// The single task that owns the interpreter.
///
/// Actions are consumed strictly one at a time — the interpreter is not safe
/// to mutate concurrently — and steps are emitted in the same order the
/// actions were issued: exactly one emission per terminating `Continue`,
/// none for `Choose`. A failed action is reported (reply slot, or an error
/// event for fire-and-forget dispatch) and the dispatcher moves on to the
/// next action.
pub(crate) struct Dispatcher<I> {
    interpreter: I,
    driver: ContinuationDriver,
    executor: CommandExecutor,
    steps: broadcast::Sender<StoryStep>,
    cancel_flag: Arc<watch::Sender<bool>>,
}

impl<I: StoryInterpreter> Dispatcher<I> {
    pub(crate) fn new(
        interpreter: I,
        driver: ContinuationDriver,
        executor: CommandExecutor,
        steps: broadcast::Sender<StoryStep>,
        cancel_flag: Arc<watch::Sender<bool>>,
    ) -> Self {
        Self {
            interpreter,
            driver,
            executor,
            steps,
            cancel_flag,
        }
    }

    pub(crate) async fn run(mut self, mut actions: mpsc::UnboundedReceiver<Envelope>) {
        while let Some(envelope) = actions.recv().await {
            // Rearm the cancel flag so a cancel only ever targets the
            // in-flight action. send_replace updates the value even while
            // nothing is subscribed.
            self.cancel_flag.send_replace(false);

            let outcome = self.handle(envelope.action).await;
            match envelope.reply {
                Some(reply) => {
                    let _ = reply.send(outcome);
                }
                None => {
                    if let Err(error) = outcome {
                        tracing::error!(%error, "story action failed");
                    }
                }
            }
        }
        tracing::debug!("action feed closed, dispatcher stopping");
    }

    async fn handle(&mut self, action: StoryAction) -> EngineResult<Option<StoryStep>> {
        match action {
            StoryAction::Choose { index, flow } => {
                // Applying a choice does not advance the story; the caller
                // issues a Continue to progress past it.
                self.interpreter.choose(index, flow.as_deref())?;
                Ok(None)
            }
            StoryAction::Continue { flow } => {
                if flow.is_some() {
                    self.interpreter.switch_flow(flow.as_deref())?;
                }
                let step = self.continue_until_settled().await?;
                let _ = self.steps.send(step.clone());
                Ok(Some(step))
            }
        }
    }

    /// The inner loop of a `Continue`: advance, discover, execute,
    /// reconcile; repeat until no command asks for more.
    async fn continue_until_settled(&mut self) -> EngineResult<StoryStep> {
        let cancel = Cancellation::new(self.cancel_flag.subscribe());
        loop {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            self.driver.drive(&mut self.interpreter, &cancel).await?;
            let step = Arc::new(self.interpreter.current_step());

            let invocations = self.executor.discover(&step);
            let groups = self.executor.execute(invocations, &step, &cancel).await?;

            match reconcile(&groups, &step)? {
                Reconciliation::Emit => {
                    return Ok(Arc::try_unwrap(step).unwrap_or_else(|shared| (*shared).clone()));
                }
                Reconciliation::Repeat => {}
                Reconciliation::TakeChoice(index) => {
                    // A command-selected choice targets the step it was
                    // discovered on, which lives on the current flow.
                    self.interpreter.choose(index, None)?;
                }
            }
        }
    }
}
