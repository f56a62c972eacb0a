//! Cancellation signalling for in-flight actions.

use tokio::sync::watch;

/// A level-triggered cancellation token threaded through the continuation
/// driver and every command execution.
///
/// Cancelling aborts the in-flight action's pipeline; the dispatcher rearms
/// the flag before the next action, so previously committed state and later
/// actions are unaffected.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A token that never fires. Used for calls that must run to completion,
    /// like the synchronous external-function bridge.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is requested. If the engine's cancel handle
    /// is gone the flag can no longer change, so a still-unset token pends
    /// forever.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
