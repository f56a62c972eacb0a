//! Shared test support: a scripted fake interpreter and recording command
//! handlers.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::mpsc;

use fabula::commands::{
    CommandContext, CommandInvocation, CommandProcessor, CommandResult,
};
use fabula::engine::{Cancellation, FollowUpKind, StoryChoice, StoryStep};
use fabula::interpreter::{
    ContinueProgress, ExternalFunction, InterpreterError, InterpreterResult, RawValue,
    ScriptValue, StoryInterpreter, VariableChange,
};

static INIT_TRACING: Once = Once::new();

/// Install a fmt subscriber once so failing tests can be rerun with
/// `RUST_LOG` diagnostics.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// An external function call a scripted step performs while continuing.
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<ScriptValue>,
    /// Variable to store the returned value into, if any.
    pub store: Option<String>,
}

/// One scripted pause point plus the work needed to produce it.
pub struct ScriptedStep {
    pub step: StoryStep,
    /// Continue increments this step takes to produce.
    pub increments: u32,
    pub calls: Vec<FunctionCall>,
    pub changes: Vec<(String, RawValue)>,
}

impl ScriptedStep {
    pub fn line(text: &str) -> Self {
        Self {
            step: StoryStep::new(text, Vec::new(), true, Vec::new(), None),
            increments: 1,
            calls: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn with_choices(text: &str, choices: &[&str]) -> Self {
        let choices = choices
            .iter()
            .enumerate()
            .map(|(index, text)| StoryChoice::new(index, *text, Vec::new()))
            .collect();
        Self {
            step: StoryStep::new(text, choices, false, Vec::new(), None),
            increments: 1,
            calls: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.step.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn increments(mut self, count: u32) -> Self {
        self.increments = count;
        self
    }

    pub fn change(mut self, name: &str, value: RawValue) -> Self {
        self.changes.push((name.to_string(), value));
        self
    }

    pub fn call(mut self, name: &str, args: Vec<ScriptValue>) -> Self {
        self.calls.push(FunctionCall {
            name: name.to_string(),
            args,
            store: None,
        });
        self
    }

    pub fn call_storing(mut self, name: &str, args: Vec<ScriptValue>, store: &str) -> Self {
        self.calls.push(FunctionCall {
            name: name.to_string(),
            args,
            store: Some(store.to_string()),
        });
        self
    }
}

/// Observations recorded by the fake interpreter for assertions.
#[derive(Default)]
pub struct InterpreterLog {
    pub chosen: Vec<(usize, Option<String>)>,
    pub flows: Vec<Option<String>>,
    pub increments: u32,
}

/// A programmable interpreter: produces a queue of scripted steps, spending
/// a configurable number of increments on each, emitting variable changes
/// and calling bound external functions as it goes.
///
/// Choosing pushes a step with the chosen text to the front of the queue,
/// so the following continue produces it.
pub struct ScriptedInterpreter {
    queue: VecDeque<ScriptedStep>,
    current: StoryStep,
    pending: Option<(ScriptedStep, u32)>,
    active_flow: Option<String>,
    functions: HashMap<String, ExternalFunction>,
    variables: HashMap<String, RawValue>,
    changes_tx: mpsc::UnboundedSender<VariableChange>,
    changes_rx: Option<mpsc::UnboundedReceiver<VariableChange>>,
    log: Arc<Mutex<InterpreterLog>>,
}

impl ScriptedInterpreter {
    pub fn new(steps: Vec<ScriptedStep>) -> Self {
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        Self {
            queue: steps.into(),
            current: StoryStep::default(),
            pending: None,
            active_flow: None,
            functions: HashMap::new(),
            variables: HashMap::new(),
            changes_tx,
            changes_rx: Some(changes_rx),
            log: Arc::new(Mutex::new(InterpreterLog::default())),
        }
    }

    pub fn with_variables(steps: Vec<ScriptedStep>, variables: &[(&str, RawValue)]) -> Self {
        let mut interpreter = Self::new(steps);
        for (name, value) in variables {
            interpreter
                .variables
                .insert(name.to_string(), value.clone());
        }
        interpreter
    }

    /// Observation handle, valid after the interpreter moves into an engine.
    pub fn log(&self) -> Arc<Mutex<InterpreterLog>> {
        Arc::clone(&self.log)
    }

    /// Sender into the raw change feed, for emitting changes from a test
    /// without continuing the story.
    pub fn change_sender(&self) -> mpsc::UnboundedSender<VariableChange> {
        self.changes_tx.clone()
    }

    fn finalize(&mut self, mut scripted: ScriptedStep) -> InterpreterResult<()> {
        for call in &scripted.calls {
            let function = self
                .functions
                .get_mut(&call.name)
                .ok_or_else(|| InterpreterError::Script(format!("unbound function {}", call.name)))?;
            let returned = function(call.args.clone())?;
            if let Some(value) = returned {
                scripted.step.text = scripted.step.text.replace("{result}", &value.to_string());
                if let Some(store) = &call.store {
                    let raw = RawValue::from_script(&value);
                    self.variables.insert(store.clone(), raw.clone());
                    let _ = self.changes_tx.send(VariableChange {
                        name: store.clone(),
                        value: raw,
                    });
                }
            }
        }

        for (name, value) in &scripted.changes {
            self.variables.insert(name.clone(), value.clone());
            let _ = self.changes_tx.send(VariableChange {
                name: name.clone(),
                value: value.clone(),
            });
        }

        if scripted.step.flow_name.is_none() {
            scripted.step.flow_name = self.active_flow.clone();
        }
        self.current = scripted.step;
        Ok(())
    }
}

impl StoryInterpreter for ScriptedInterpreter {
    fn continue_increment(&mut self, _budget: Duration) -> InterpreterResult<ContinueProgress> {
        self.log.lock().unwrap().increments += 1;

        if self.pending.is_none() {
            match self.queue.pop_front() {
                Some(scripted) => {
                    let needed = scripted.increments.max(1);
                    self.pending = Some((scripted, needed));
                }
                None => {
                    self.current = StoryStep::default();
                    return Ok(ContinueProgress::Done);
                }
            }
        }

        let (_, remaining) = self.pending.as_mut().unwrap();
        *remaining -= 1;
        if *remaining > 0 {
            return Ok(ContinueProgress::Pending);
        }

        let (scripted, _) = self.pending.take().unwrap();
        self.finalize(scripted)?;
        Ok(ContinueProgress::Done)
    }

    fn current_step(&self) -> StoryStep {
        self.current.clone()
    }

    fn choose(&mut self, index: usize, flow: Option<&str>) -> InterpreterResult<()> {
        self.log
            .lock()
            .unwrap()
            .chosen
            .push((index, flow.map(str::to_string)));

        let choice = self
            .current
            .choices
            .iter()
            .find(|choice| choice.index == index)
            .ok_or(InterpreterError::InvalidChoice(index))?;
        self.queue.push_front(ScriptedStep::line(&choice.text));
        Ok(())
    }

    fn switch_flow(&mut self, flow: Option<&str>) -> InterpreterResult<()> {
        self.log
            .lock()
            .unwrap()
            .flows
            .push(flow.map(str::to_string));
        self.active_flow = flow.map(str::to_string);
        Ok(())
    }

    fn bind_external_function(
        &mut self,
        name: &str,
        function: ExternalFunction,
    ) -> InterpreterResult<()> {
        if self.functions.contains_key(name) {
            return Err(InterpreterError::AlreadyBound(name.to_string()));
        }
        self.functions.insert(name.to_string(), function);
        Ok(())
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    fn variable_value(&self, name: &str) -> Option<RawValue> {
        self.variables.get(name).cloned()
    }

    fn take_variable_changes(&mut self) -> mpsc::UnboundedReceiver<VariableChange> {
        self.changes_rx.take().unwrap_or_else(|| {
            let (_tx, rx) = mpsc::unbounded_channel();
            rx
        })
    }
}

/// A string command handler that records its invocations and optionally
/// waits before resolving.
pub struct RecordingCommand {
    name: String,
    records: Arc<Mutex<Vec<CommandInvocation<String>>>>,
    delay: Option<Duration>,
    follow_up: Option<FollowUpKind>,
}

impl RecordingCommand {
    pub fn new(name: &str) -> (Self, Arc<Mutex<Vec<CommandInvocation<String>>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.to_string(),
                records: Arc::clone(&records),
                delay: None,
                follow_up: None,
            },
            records,
        )
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requesting(mut self, follow_up: FollowUpKind) -> Self {
        self.follow_up = Some(follow_up);
        self
    }
}

#[async_trait]
impl CommandProcessor for RecordingCommand {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        invocation: CommandInvocation<String>,
        context: &mut CommandContext,
        cancel: Cancellation,
    ) -> CommandResult<()> {
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Ok(()),
            }
        }
        self.records.lock().unwrap().push(invocation);
        match self.follow_up {
            Some(FollowUpKind::Continue) => context.continue_story(),
            Some(FollowUpKind::Choice(index)) => context.take_choice(index),
            _ => {}
        }
        Ok(())
    }
}

/// A value command handler, bindable as an external function.
pub struct RecordingFunction {
    name: String,
    records: Arc<Mutex<Vec<CommandInvocation<ScriptValue>>>>,
    result: Option<ScriptValue>,
    suspend: bool,
}

impl RecordingFunction {
    pub fn new(name: &str) -> (Self, Arc<Mutex<Vec<CommandInvocation<ScriptValue>>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.to_string(),
                records: Arc::clone(&records),
                result: None,
                suspend: false,
            },
            records,
        )
    }

    pub fn returning(mut self, value: ScriptValue) -> Self {
        self.result = Some(value);
        self
    }

    pub fn suspending(mut self) -> Self {
        self.suspend = true;
        self
    }
}

#[async_trait]
impl CommandProcessor<ScriptValue> for RecordingFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_as_external_function(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        invocation: CommandInvocation<ScriptValue>,
        context: &mut CommandContext,
        _cancel: Cancellation,
    ) -> CommandResult<()> {
        if self.suspend {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        self.records.lock().unwrap().push(invocation);
        if let Some(value) = &self.result {
            context.set_result(value.clone());
        }
        Ok(())
    }
}
