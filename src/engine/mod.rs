//! Engine core and public API.
//!
//! The engine wires the pieces together: a dispatcher task that owns the
//! interpreter and processes caller actions one at a time, a continuation
//! driver that advances the interpreter inside a time budget, a command
//! executor that fans out the commands discovered on each step, a
//! reconciler that folds their follow-up requests into one decision, and a
//! variable hub that turns the interpreter's raw change feed into
//! per-variable streams.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Caller actions and per-command follow-up requests.
pub mod action;
/// Cancellation signalling for in-flight actions.
pub mod cancel;
/// Engine error taxonomy.
pub mod error;
/// Per-engine identity minting.
pub mod ident;
/// Immutable step snapshots.
pub mod step;
/// Live streams of script variables.
pub mod variables;

mod dispatcher;
mod driver;
mod executor;
mod reconcile;

pub use action::{FollowUpAction, FollowUpKind, StoryAction};
pub use cancel::Cancellation;
pub use error::{EngineError, EngineResult, ReconcileError, VariableError};
pub use ident::{Ident, IdentAllocator};
pub use step::{StoryChoice, StoryStep};
pub use variables::VariableStream;

use crate::commands::processor::CommandRegistry;
use crate::commands::{CommandParser, CommandProcessor};
use crate::interpreter::{ScriptValue, StoryInterpreter};

use dispatcher::{Dispatcher, Envelope};
use driver::ContinuationDriver;
use executor::{external_function_bridge, CommandExecutor};
use variables::VariableHub;

/// Configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum wall time the interpreter may spend per continue increment.
    /// Defaults to half of one 60 Hz frame.
    pub budget: Duration,

    /// Capacity of the step feed; a subscriber lagging further than this
    /// observes a lag error rather than stalling the dispatcher.
    pub step_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_micros(8_333),
            step_capacity: 64,
        }
    }
}

/// Builder wiring discovery strategies and command handlers into an engine.
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    parsers: Vec<Box<dyn CommandParser>>,
    commands: Vec<Arc<dyn CommandProcessor<String>>>,
    functions: Vec<Arc<dyn CommandProcessor<ScriptValue>>>,
}

impl EngineBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-increment time budget.
    pub fn budget(mut self, budget: Duration) -> Self {
        self.config.budget = budget;
        self
    }

    /// Add a command discovery strategy.
    pub fn parser(mut self, parser: impl CommandParser + 'static) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Register a string-parameter command handler (line/tag commands).
    pub fn command(mut self, processor: impl CommandProcessor<String> + 'static) -> Self {
        self.commands.push(Arc::new(processor));
        self
    }

    /// Register a value-parameter command handler; handlers flagged as
    /// external functions are bound into the interpreter at build time.
    pub fn function(mut self, processor: impl CommandProcessor<ScriptValue> + 'static) -> Self {
        self.functions.push(Arc::new(processor));
        self
    }

    /// Wire everything up and start the engine's tasks.
    ///
    /// Binds the flagged external functions, seeds the variable hub from
    /// the interpreter's current globals (variables without a public value
    /// representation are excluded from the observed set), and spawns the
    /// dispatcher and hub tasks. Must be called from within a Tokio
    /// runtime.
    pub fn build<I: StoryInterpreter>(self, mut interpreter: I) -> EngineResult<Engine> {
        let registry = CommandRegistry::new(self.commands)?;

        for processor in &self.functions {
            if processor.register_as_external_function() {
                let name = processor.name().to_string();
                interpreter
                    .bind_external_function(&name, external_function_bridge(Arc::clone(processor)))?;
            }
        }

        let changes = interpreter.take_variable_changes();
        let hub = Arc::new(VariableHub::new());
        for name in interpreter.variable_names() {
            let Some(raw) = interpreter.variable_value(&name) else {
                continue;
            };
            match ScriptValue::from_raw(&raw) {
                Some(value) => hub.seed(name, value),
                None => {
                    tracing::debug!(variable = %name, "excluding variable without a public value")
                }
            }
        }

        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let (steps_tx, _) = broadcast::channel(self.config.step_capacity);
        let (cancel_tx, _) = watch::channel(false);
        let cancel_flag = Arc::new(cancel_tx);

        let hub_task = tokio::spawn(Arc::clone(&hub).run(changes));
        let dispatcher = Dispatcher::new(
            interpreter,
            ContinuationDriver::new(self.config.budget),
            CommandExecutor::new(registry, self.parsers),
            steps_tx.clone(),
            Arc::clone(&cancel_flag),
        );
        let dispatcher_task = tokio::spawn(dispatcher.run(actions_rx));

        Ok(Engine {
            actions: actions_tx,
            steps: steps_tx,
            hub,
            cancel_flag,
            dispatcher_task,
            hub_task,
        })
    }
}

/// Handle to a running engine.
///
/// Actions sent through this handle form one totally ordered feed; steps
/// come back in the same order, one per terminating `Continue`.
pub struct Engine {
    actions: mpsc::UnboundedSender<Envelope>,
    steps: broadcast::Sender<StoryStep>,
    hub: Arc<VariableHub>,
    cancel_flag: Arc<watch::Sender<bool>>,
    dispatcher_task: JoinHandle<()>,
    hub_task: JoinHandle<()>,
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Queue an action without waiting for its outcome. A failed action is
    /// reported as an error-level event.
    pub fn dispatch(&self, action: StoryAction) -> EngineResult<()> {
        self.actions
            .send(Envelope {
                action,
                reply: None,
            })
            .map_err(|_| EngineError::Stopped)
    }

    /// Queue an action and wait for its outcome: the emitted step for a
    /// `Continue`, `None` for a `Choose`.
    pub async fn run(&self, action: StoryAction) -> EngineResult<Option<StoryStep>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.actions
            .send(Envelope {
                action,
                reply: Some(reply_tx),
            })
            .map_err(|_| EngineError::Stopped)?;
        reply_rx.await.map_err(|_| EngineError::Stopped)?
    }

    /// Continue on the current flow and wait for the emitted step.
    pub async fn continue_story(&self) -> EngineResult<StoryStep> {
        self.run(StoryAction::continue_story())
            .await?
            .ok_or(EngineError::Stopped)
    }

    /// Apply a choice on the current flow and wait until it is applied.
    /// The story does not advance until the next `Continue`.
    pub async fn take_choice(&self, index: usize) -> EngineResult<()> {
        self.run(StoryAction::choose(index)).await.map(|_| ())
    }

    /// Subscribe to the feed of emitted steps. Only steps emitted after
    /// subscribing are observed.
    pub fn subscribe_steps(&self) -> broadcast::Receiver<StoryStep> {
        self.steps.subscribe()
    }

    /// Stream of values for one observed variable; fatal if the variable
    /// was never initialized into the observed set.
    pub fn variable_stream(&self, name: &str) -> EngineResult<VariableStream> {
        Ok(self.hub.subscribe(name)?)
    }

    /// Names of all observed variables.
    pub fn observed_variable_names(&self) -> Vec<String> {
        self.hub.observed_names()
    }

    /// Abort the in-flight action's pipeline. Later actions are unaffected;
    /// interpreter state committed before the abort stays valid.
    pub fn cancel(&self) {
        self.cancel_flag.send_replace(true);
    }

    /// Stop the engine: close the action feed and wait for the dispatcher
    /// and hub tasks to finish. Variable streams end once the hub stops.
    pub async fn shutdown(self) {
        drop(self.actions);
        if let Err(error) = self.dispatcher_task.await {
            tracing::warn!(%error, "dispatcher task ended abnormally");
        }
        if let Err(error) = self.hub_task.await {
            tracing::warn!(%error, "variable hub task ended abnormally");
        }
    }
}
