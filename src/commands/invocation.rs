//! Information about a single command to execute.

use std::collections::HashMap;

use super::{CommandError, CommandResult};

/// A discovered command: its name plus the parameters the discovery strategy
/// extracted. Immutable once built.
///
/// `V` is the parameter value type: `String` for line/tag discovery,
/// [`ScriptValue`](crate::interpreter::ScriptValue) for script-bound external
/// functions.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation<V = String> {
    name: String,
    named: HashMap<String, V>,
    positional: Vec<V>,
}

impl<V> CommandInvocation<V> {
    /// Create an invocation with both parameter kinds.
    pub fn new(
        name: impl Into<String>,
        named: HashMap<String, V>,
        positional: Vec<V>,
    ) -> Self {
        Self {
            name: name.into(),
            named,
            positional,
        }
    }

    /// Create an invocation with named parameters only.
    pub fn named(name: impl Into<String>, named: HashMap<String, V>) -> Self {
        Self::new(name, named, Vec::new())
    }

    /// Create an invocation with positional parameters only.
    pub fn positional(name: impl Into<String>, positional: Vec<V>) -> Self {
        Self::new(name, HashMap::new(), positional)
    }

    /// Name of the command. A bare prefix line discovers an empty name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a named parameter, failing if it is absent.
    pub fn named_parameter(&self, key: &str) -> CommandResult<&V> {
        self.named
            .get(key)
            .ok_or_else(|| CommandError::MissingNamed(key.to_string()))
    }

    /// Get a named parameter if present.
    pub fn try_named_parameter(&self, key: &str) -> Option<&V> {
        self.named.get(key)
    }

    /// Get a positional parameter, failing if the index is out of range.
    pub fn positional_parameter(&self, index: usize) -> CommandResult<&V> {
        self.positional
            .get(index)
            .ok_or(CommandError::MissingPositional(index))
    }

    /// Get a positional parameter if the index is in range.
    pub fn try_positional_parameter(&self, index: usize) -> Option<&V> {
        self.positional.get(index)
    }

    /// Number of positional parameters.
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Names of all named parameters, in no particular order.
    pub fn named_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    /// Number of named parameters.
    pub fn named_len(&self) -> usize {
        self.named.len()
    }
}
