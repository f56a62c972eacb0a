//! Immutable snapshots of narrative pause points.

use serde::{Deserialize, Serialize};

/// One pause point in narrative execution: display text, the choices now
/// pending, and the tags attached to the step.
///
/// Created once per produced step and never mutated; the engine shares it
/// read-only across every command executing on that step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryStep {
    /// Display text, trimmed.
    pub text: String,
    /// Choices pending at this step, in script order.
    pub choices: Vec<StoryChoice>,
    /// Whether the story can continue from here (it is not the end, and no
    /// choice is pending).
    pub can_continue: bool,
    /// Tags attached to this step; empty for most steps.
    pub tags: Vec<String>,
    /// Name of the flow that produced this step; `None` is the default flow.
    pub flow_name: Option<String>,
}

impl StoryStep {
    /// Build a step snapshot, trimming the display text.
    pub fn new(
        text: impl AsRef<str>,
        choices: Vec<StoryChoice>,
        can_continue: bool,
        tags: Vec<String>,
        flow_name: Option<String>,
    ) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            choices,
            can_continue,
            tags,
            flow_name,
        }
    }

    /// Whether any choice is pending at this step.
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// One selectable choice within a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryChoice {
    /// Index to pass back when taking this choice.
    pub index: usize,
    /// Display text, trimmed.
    pub text: String,
    /// Tags attached to this choice.
    pub tags: Vec<String>,
}

impl StoryChoice {
    /// Build a choice, trimming the display text.
    pub fn new(index: usize, text: impl AsRef<str>, tags: Vec<String>) -> Self {
        Self {
            index,
            text: text.as_ref().trim().to_string(),
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed() {
        let step = StoryStep::new("  First line.\n", Vec::new(), true, Vec::new(), None);
        assert_eq!(step.text, "First line.");
        assert!(!step.has_choices());

        let choice = StoryChoice::new(0, " Entry 1 ", Vec::new());
        assert_eq!(choice.text, "Entry 1");
    }

    #[test]
    fn steps_serialize_for_host_persistence() {
        let step = StoryStep::new(
            "A door.",
            vec![StoryChoice::new(0, "Open it", vec!["bold".to_string()])],
            false,
            vec!["scene:hall".to_string()],
            Some("side".to_string()),
        );
        let json = serde_json::to_string(&step).unwrap();
        let back: StoryStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
