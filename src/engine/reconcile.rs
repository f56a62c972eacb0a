//! Combining per-command follow-up requests into one decision.

use super::action::{FollowUpAction, FollowUpKind};
use super::error::ReconcileError;
use super::step::StoryStep;

/// Follow-up requests for one step, partitioned by kind. `DoNothing`
/// requests are discarded on push.
#[derive(Debug, Default)]
pub(crate) struct FollowUpGroups {
    continue_requests: Vec<String>,
    choice_requests: Vec<(String, usize)>,
}

impl FollowUpGroups {
    pub(crate) fn push(&mut self, action: FollowUpAction) {
        match action.kind {
            FollowUpKind::DoNothing => {}
            FollowUpKind::Continue => self.continue_requests.push(action.command),
            FollowUpKind::Choice(index) => self.choice_requests.push((action.command, index)),
        }
    }

    fn choice_commands(&self) -> Vec<String> {
        self.choice_requests
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }
}

/// The single decision reconciliation produces for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconciliation {
    /// No command requested anything: stop looping and emit the step.
    Emit,
    /// At least one command asked to continue: run the loop again.
    Repeat,
    /// Exactly one command selected a choice: apply it, then run again.
    TakeChoice(usize),
}

/// Evaluate the combined requests against the step's pending choices.
///
/// Conflicting requests are fatal and name the offending commands; the
/// caller's action fails and is not retried.
pub(crate) fn reconcile(
    groups: &FollowUpGroups,
    step: &StoryStep,
) -> Result<Reconciliation, ReconcileError> {
    if !step.has_choices() {
        if !groups.choice_requests.is_empty() {
            return Err(ReconcileError::ChoiceWithoutChoices {
                commands: groups.choice_commands(),
            });
        }
        if !groups.continue_requests.is_empty() {
            return Ok(Reconciliation::Repeat);
        }
        return Ok(Reconciliation::Emit);
    }

    if !groups.continue_requests.is_empty() {
        return Err(ReconcileError::ContinueWithPendingChoice {
            commands: groups.continue_requests.clone(),
        });
    }
    match groups.choice_requests.as_slice() {
        [] => Ok(Reconciliation::Emit),
        [(_, index)] => Ok(Reconciliation::TakeChoice(*index)),
        _ => Err(ReconcileError::ConflictingChoices {
            commands: groups.choice_commands(),
        }),
    }
}
