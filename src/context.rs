//! Workflow context port and the file-backed context used by the CLI.
//!
//! The context is owned by the host workflow engine for the lifetime of one
//! pipeline run. Every component reads and writes it through the narrow
//! [`ContextStore`] port, so no storage implementation is assumed.
//!
//! Lookups are forgiving: an absent key, or a value of the wrong JSON type,
//! resolves to the caller-supplied default instead of failing.

use crate::error::{OpsError, Result};
use crate::fs::atomic_write;
use serde_json::{Map, Value};
use std::path::Path;

/// Key/value port onto the shared workflow context.
///
/// Last writer wins; no key uniqueness is enforced beyond map semantics.
pub trait ContextStore {
    /// Read a value by key.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value, replacing any previous value for the key.
    fn set(&mut self, key: &str, value: Value);

    /// Read a boolean, falling back to `default` when absent or not a bool.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        as_bool(self.get(key).as_ref(), default)
    }

    /// Read a number as `f64`, falling back to `default` when absent or not a number.
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        as_f64(self.get(key).as_ref(), default)
    }

    /// Read a string, falling back to `default` when absent or not a string.
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s,
            _ => default.to_string(),
        }
    }

    /// Read an object; anything else (including absence) is an empty map.
    fn get_object(&self, key: &str) -> Map<String, Value> {
        match self.get(key) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl ContextStore for Map<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        Map::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

/// Boolean view of an optional JSON value.
pub fn as_bool(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

/// Numeric view of an optional JSON value; integers and floats both count.
pub fn as_f64(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(default)
}

/// Boolean field of an object.
pub fn field_bool(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    as_bool(map.get(key), default)
}

/// Numeric field of an object.
pub fn field_f64(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    as_f64(map.get(key), default)
}

/// String field of an object.
pub fn field_str<'a>(map: &'a Map<String, Value>, key: &str, default: &'a str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// In-memory workflow context backed by a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowContext {
    values: Map<String, Value>,
}

impl WorkflowContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Build a context from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(OpsError::UserError(format!(
                "workflow context must be a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Load a context from a JSON file.
    ///
    /// A missing file is treated as an empty context so the first node of a
    /// pipeline run can create it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            OpsError::UserError(format!(
                "failed to read context file '{}': {}",
                path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            OpsError::UserError(format!(
                "failed to parse context file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_value(value)
    }

    /// Atomically write the context to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.values)?;
        json.push('\n');
        atomic_write(path, json.as_bytes())
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consume the context into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ContextStore for WorkflowContext {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
