//! Budgeted, cooperative advancement of the interpreter.

use std::time::Duration;

use crate::interpreter::{ContinueProgress, StoryInterpreter};

use super::cancel::Cancellation;
use super::error::{EngineError, EngineResult};

/// Drives one continue to completion without ever spending more than the
/// configured budget inside a single increment.
///
/// After each incomplete increment the driver yields back to the host
/// scheduler and resumes on the next scheduling opportunity, so a single
/// long narrative step is spread across ticks instead of starving the
/// host's frame loop.
pub(crate) struct ContinuationDriver {
    budget: Duration,
}

impl ContinuationDriver {
    pub(crate) fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Advance the interpreter until the current step finishes producing.
    ///
    /// Checks for cancellation between increments; an abort leaves the
    /// interpreter at whatever increment boundary it had reached, which is
    /// a valid state to resume from.
    pub(crate) async fn drive<I: StoryInterpreter>(
        &self,
        interpreter: &mut I,
        cancel: &Cancellation,
    ) -> EngineResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            match interpreter.continue_increment(self.budget)? {
                ContinueProgress::Done => return Ok(()),
                ContinueProgress::Pending => tokio::task::yield_now().await,
            }
        }
    }
}
