//! Live, replay-capable streams of script variables.
//!
//! One listener on the interpreter's raw change feed fans notifications out
//! to per-variable slots; each slot keeps the latest value and the list of
//! active subscribers. There is no reactive-stream machinery behind this —
//! the registry, the buffer, and the fan-out are all explicit.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::interpreter::{ScriptValue, VariableChange};

use super::error::VariableError;
use super::ident::{Ident, IdentAllocator};

/// A multicast stream of one variable's values.
///
/// Replays the single most recent value immediately on subscription (the
/// seeded initial value before the first real change), then yields one value
/// per underlying change. Independent subscribers see the same sequence.
pub struct VariableStream {
    name: String,
    rx: mpsc::UnboundedReceiver<ScriptValue>,
}

impl VariableStream {
    /// Name of the observed variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receive the next value. Returns `None` once the engine that feeds
    /// this stream has shut down.
    pub async fn recv(&mut self) -> Option<ScriptValue> {
        self.rx.recv().await
    }

    /// Receive the next value if one is already queued.
    pub fn try_recv(&mut self) -> Option<ScriptValue> {
        self.rx.try_recv().ok()
    }
}

struct Subscriber {
    id: Ident,
    tx: mpsc::UnboundedSender<ScriptValue>,
}

struct VariableSlot {
    last: ScriptValue,
    subscribers: Vec<Subscriber>,
}

/// Fan-out registry from variable name to buffer + subscribers.
pub(crate) struct VariableHub {
    slots: Mutex<HashMap<String, VariableSlot>>,
    idents: IdentAllocator,
}

impl VariableHub {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idents: IdentAllocator::new(),
        }
    }

    /// Install a variable with its initial value. Only seeded variables are
    /// observable; callers skip variables whose current value has no public
    /// conversion, which excludes them from the observed set entirely.
    pub(crate) fn seed(&self, name: impl Into<String>, value: ScriptValue) {
        self.slots.lock().insert(
            name.into(),
            VariableSlot {
                last: value,
                subscribers: Vec::new(),
            },
        );
    }

    /// Names of every observed variable.
    pub(crate) fn observed_names(&self) -> Vec<String> {
        self.slots.lock().keys().cloned().collect()
    }

    /// Subscribe to a variable's stream; fatal if the variable was never
    /// initialized into the observed set.
    pub(crate) fn subscribe(&self, name: &str) -> Result<VariableStream, VariableError> {
        let mut slots = self.slots.lock();
        let slot = slots
            .get_mut(name)
            .ok_or_else(|| VariableError::Unknown(name.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Replay the latest value before any further change can arrive.
        let _ = tx.send(slot.last.clone());
        slot.subscribers.push(Subscriber {
            id: self.idents.mint(),
            tx,
        });

        Ok(VariableStream {
            name: name.to_string(),
            rx,
        })
    }

    /// Apply one notification from the raw feed: ignored unless it names an
    /// observed variable and its new value converts to the public
    /// representation.
    pub(crate) fn apply(&self, change: VariableChange) {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(&change.name) else {
            tracing::debug!(variable = %change.name, "dropping change for unobserved variable");
            return;
        };
        let Some(value) = ScriptValue::from_raw(&change.value) else {
            tracing::debug!(variable = %change.name, "dropping non-convertible change");
            return;
        };

        slot.last = value.clone();
        slot.subscribers.retain(|subscriber| {
            let delivered = subscriber.tx.send(value.clone()).is_ok();
            if !delivered {
                tracing::trace!(subscriber = ?subscriber.id, "pruning closed subscriber");
            }
            delivered
        });
    }

    /// Drain the raw feed until the interpreter side closes it.
    pub(crate) async fn run(
        self: Arc<Self>,
        mut changes: mpsc::UnboundedReceiver<VariableChange>,
    ) {
        while let Some(change) = changes.recv().await {
            self.apply(change);
        }
    }
}
