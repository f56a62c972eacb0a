//! The default tag command discovery strategy.
//!
//! Each step tag is split on `:`; the first segment is the command name and
//! must match a registered command (anything else is an ordinary tag, not a
//! command), the remaining segments become positional parameters in order.

use super::parser::{CommandParser, ParseContext};
use super::CommandInvocation;

/// Tag discovery strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagCommandParser;

impl TagCommandParser {
    /// Create a tag parser.
    pub fn new() -> Self {
        Self
    }
}

impl CommandParser for TagCommandParser {
    fn parse(&self, context: &ParseContext<'_>) -> Vec<CommandInvocation<String>> {
        context
            .step
            .tags
            .iter()
            .filter_map(|tag| {
                let mut segments = tag.split(':');
                let name = segments.next().unwrap_or_default();
                if !context.known_commands.iter().any(|known| known == name) {
                    return None;
                }
                Some(CommandInvocation::positional(
                    name,
                    segments.map(str::to_string).collect(),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::StoryStep;

    use super::*;

    fn discover(tags: &[&str], known: &[&str]) -> Vec<CommandInvocation<String>> {
        let step = StoryStep::new(
            "",
            Vec::new(),
            true,
            tags.iter().map(|tag| tag.to_string()).collect(),
            None,
        );
        let known: Vec<String> = known.iter().map(|name| name.to_string()).collect();
        TagCommandParser::new().parse(&ParseContext {
            step: &step,
            known_commands: &known,
        })
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let found = discover(&["cmd:x:y", "other:z"], &["cmd"]);
        assert_eq!(found.len(), 1);
        let invocation = &found[0];
        assert_eq!(invocation.name(), "cmd");
        assert_eq!(invocation.positional_len(), 2);
        assert_eq!(invocation.positional_parameter(0).unwrap(), "x");
        assert_eq!(invocation.positional_parameter(1).unwrap(), "y");
        assert_eq!(invocation.named_len(), 0);
    }

    #[test]
    fn tag_without_segments_has_no_parameters() {
        let found = discover(&["flash"], &["flash"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "flash");
        assert_eq!(found[0].positional_len(), 0);
    }

    #[test]
    fn every_known_tag_discovers_one_invocation() {
        let found = discover(&["fade:in", "mood", "fade:out"], &["fade", "mood"]);
        assert_eq!(found.len(), 3);
    }
}
