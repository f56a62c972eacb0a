//! The default line command discovery strategy.
//!
//! Matches lines of step text that start with a prefix (default `@`):
//!
//! ```text
//! @moveCamera target:Elizabeth smooth:true
//! ```
//!
//! All parameters are named, in the form `name:value`, separated by
//! whitespace. A value that needs to contain whitespace is wrapped in
//! quotes (`"`):
//!
//! ```text
//! @hiddenText over:Mirror text:"Its surface swirls like a whirlpool"
//! ```

use std::collections::HashMap;

use super::parser::{CommandParser, ParseContext};
use super::CommandInvocation;

/// Default prefix marking a command line.
pub const DEFAULT_PREFIX: &str = "@";

/// Line discovery strategy with a configurable prefix.
#[derive(Debug, Clone)]
pub struct LineCommandParser {
    prefix: String,
}

impl Default for LineCommandParser {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

impl LineCommandParser {
    /// Create a parser using the default `@` prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser matching lines that start with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Parse the remainder of a matched line into one invocation.
    ///
    /// A bare prefix line yields an invocation whose name is empty; that
    /// degenerate invocation is produced, not filtered.
    fn parse_line(&self, rest: &str) -> CommandInvocation<String> {
        let rest = rest.trim();
        let (name, mut tail) = match rest.find(char::is_whitespace) {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, ""),
        };

        let mut named = HashMap::new();
        loop {
            tail = tail.trim_start();
            if tail.is_empty() {
                break;
            }
            match take_pair(tail) {
                Some((key, value, remainder)) => {
                    named.insert(key.to_string(), value);
                    tail = remainder;
                }
                None => {
                    let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
                    tracing::debug!(token = &tail[..end], "skipping token without name:value shape");
                    tail = &tail[end..];
                }
            }
        }

        CommandInvocation::named(name, named)
    }
}

impl CommandParser for LineCommandParser {
    fn parse(&self, context: &ParseContext<'_>) -> Vec<CommandInvocation<String>> {
        context
            .step
            .text
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix(self.prefix.as_str()))
            .map(|rest| self.parse_line(rest))
            .collect()
    }
}

/// Split one `name:value` pair off the front of `input`.
///
/// Returns the parameter name, its (unquoted) value, and the remaining
/// input, or `None` if the front of `input` is not a well-formed pair.
fn take_pair(input: &str) -> Option<(&str, String, &str)> {
    let colon = input.find(':')?;
    let key = &input[..colon];
    if !is_parameter_name(key) {
        return None;
    }

    let after = &input[colon + 1..];
    if let Some(quoted) = after.strip_prefix('"') {
        // Quoted values may contain whitespace; an unterminated quote is
        // not a pair.
        let end = quoted.find('"')?;
        Some((key, quoted[..end].to_string(), &quoted[end + 1..]))
    } else {
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        Some((key, after[..end].to_string(), &after[end..]))
    }
}

fn is_parameter_name(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}
