//! Caller actions and per-command follow-up requests.

use serde::{Deserialize, Serialize};

/// An action issued by the caller to make the story progress.
///
/// Actions are consumed exactly once, in arrival order, one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryAction {
    /// Advance the story until the next pause point.
    Continue {
        /// Flow to advance; `None` stays on the interpreter's current flow.
        flow: Option<String>,
    },
    /// Apply a choice. Applying alone does not advance the story; issue a
    /// `Continue` afterwards to progress past it.
    Choose {
        /// Index of the choice to take.
        index: usize,
        /// Flow the choice belongs to; `None` is the current flow.
        flow: Option<String>,
    },
}

impl StoryAction {
    /// A continue on the current flow.
    pub fn continue_story() -> Self {
        StoryAction::Continue { flow: None }
    }

    /// A continue on a named flow.
    pub fn continue_flow(flow: impl Into<String>) -> Self {
        StoryAction::Continue {
            flow: Some(flow.into()),
        }
    }

    /// A choice on the current flow.
    pub fn choose(index: usize) -> Self {
        StoryAction::Choose { index, flow: None }
    }

    /// A choice on a named flow.
    pub fn choose_in_flow(index: usize, flow: impl Into<String>) -> Self {
        StoryAction::Choose {
            index,
            flow: Some(flow.into()),
        }
    }
}

/// What one command asked to happen after it ran, tagged with the command's
/// name for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpAction {
    /// Name of the command that produced this request.
    pub command: String,
    /// The requested follow-up.
    pub kind: FollowUpKind,
}

/// The follow-up a command may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUpKind {
    /// No request; the default.
    DoNothing,
    /// Continue the story past the current step.
    Continue,
    /// Take the choice at this index.
    Choice(usize),
}
