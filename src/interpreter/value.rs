use serde::{Deserialize, Serialize};
use std::fmt;

/// Public script value as observed by hosts: variable stream items, external
/// function arguments and return values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// UTF-8 string value.
    String(String),
    /// Divert target (a path into the script).
    Divert(String),
    /// Homogeneous-or-not list of values.
    List(Vec<ScriptValue>),
}

impl ScriptValue {
    /// Attempt to convert an interpreter-native [`RawValue`] into a public
    /// value. Returns `None` for representations that have no public
    /// equivalent (pointers, void).
    pub fn from_raw(raw: &RawValue) -> Option<ScriptValue> {
        match raw {
            RawValue::Bool(flag) => Some(ScriptValue::Bool(*flag)),
            RawValue::Int(num) => Some(ScriptValue::Int(*num)),
            RawValue::Float(num) => Some(ScriptValue::Float(*num)),
            RawValue::String(text) => Some(ScriptValue::String(text.clone())),
            RawValue::Divert(path) => Some(ScriptValue::Divert(path.clone())),
            RawValue::List(items) => {
                let mut converted = Vec::with_capacity(items.len());
                for item in items {
                    converted.push(ScriptValue::from_raw(item)?);
                }
                Some(ScriptValue::List(converted))
            }
            RawValue::Pointer { .. } | RawValue::Void => None,
        }
    }

    /// Convenience accessor for string references.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(text) => Some(text),
            ScriptValue::Divert(path) => Some(path),
            _ => None,
        }
    }

    /// Convenience accessor for integers.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(num) => Some(*num),
            _ => None,
        }
    }

    /// Convenience accessor for booleans.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Convenience accessor for floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScriptValue::Float(num) => Some(*num),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Bool(flag) => write!(f, "{}", flag),
            ScriptValue::Int(num) => write!(f, "{}", num),
            ScriptValue::Float(num) => write!(f, "{}", num),
            ScriptValue::String(text) => write!(f, "{}", text),
            ScriptValue::Divert(path) => write!(f, "{}", path),
            ScriptValue::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for ScriptValue {
    fn from(num: i64) -> Self {
        ScriptValue::Int(num)
    }
}

impl From<f64> for ScriptValue {
    fn from(num: f64) -> Self {
        ScriptValue::Float(num)
    }
}

impl From<bool> for ScriptValue {
    fn from(flag: bool) -> Self {
        ScriptValue::Bool(flag)
    }
}

impl From<&str> for ScriptValue {
    fn from(text: &str) -> Self {
        ScriptValue::String(text.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(text: String) -> Self {
        ScriptValue::String(text)
    }
}

/// Interpreter-native variable representation. Interpreters may store values
/// that have no public equivalent; those are modelled here so the variable
/// hub can filter them out instead of surfacing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// UTF-8 string value.
    String(String),
    /// Divert target path.
    Divert(String),
    /// List of raw values.
    List(Vec<RawValue>),
    /// Internal variable pointer; not observable by hosts.
    Pointer {
        /// Name of the variable pointed at.
        name: String,
        /// Interpreter-internal context the pointer resolves in.
        context_index: i32,
    },
    /// Absent value; not observable by hosts.
    Void,
}

impl RawValue {
    /// Wrap a public value back into the interpreter-native representation.
    pub fn from_script(value: &ScriptValue) -> RawValue {
        match value {
            ScriptValue::Bool(flag) => RawValue::Bool(*flag),
            ScriptValue::Int(num) => RawValue::Int(*num),
            ScriptValue::Float(num) => RawValue::Float(*num),
            ScriptValue::String(text) => RawValue::String(text.clone()),
            ScriptValue::Divert(path) => RawValue::Divert(path.clone()),
            ScriptValue::List(items) => {
                RawValue::List(items.iter().map(RawValue::from_script).collect())
            }
        }
    }
}
