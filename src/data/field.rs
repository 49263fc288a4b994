//! Explicit field extraction from loosely structured JSON
//!
//! Payloads are accessed by key path. Instead of collapsing every miss to a
//! default, lookups return a [`Field`] that records whether the key was
//! absent, null, of an unexpected type, or present.

use serde_json::{Map, Value};

/// Outcome of reading one field from a JSON object
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The key does not exist (or the container is not an object)
    Absent,
    /// The key exists with a JSON null
    Null,
    /// The key exists but its value has the wrong type
    Mismatch(&'static str),
    /// The key exists with a usable value
    Present(T),
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value, or `default` when the field is not usable
    pub fn or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }

    /// Short description of why the field could not be used, if it couldn't
    pub fn problem(&self) -> Option<String> {
        match self {
            Field::Absent => Some("missing".to_string()),
            Field::Null => Some("null".to_string()),
            Field::Mismatch(found) => Some(format!("not usable (found {})", found)),
            Field::Present(_) => None,
        }
    }
}

/// Name of a JSON value's type, for diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn raw<'a>(object: &'a Map<String, Value>, key: &str) -> Field<&'a Value> {
    match object.get(key) {
        None => Field::Absent,
        Some(Value::Null) => Field::Null,
        Some(value) => Field::Present(value),
    }
}

/// Reads a number; numeric strings such as `"2.50"` are accepted
pub fn number(object: &Map<String, Value>, key: &str) -> Field<f64> {
    match raw(object, key) {
        Field::Present(Value::Number(n)) => match n.as_f64() {
            Some(v) => Field::Present(v),
            None => Field::Mismatch("number"),
        },
        Field::Present(Value::String(s)) => match s.trim().replace(',', "").parse::<f64>() {
            Ok(v) if v.is_finite() => Field::Present(v),
            _ => Field::Mismatch("string"),
        },
        Field::Present(other) => Field::Mismatch(type_name(other)),
        Field::Absent => Field::Absent,
        Field::Null => Field::Null,
        Field::Mismatch(found) => Field::Mismatch(found),
    }
}

/// Reads a string; numbers and booleans are converted to their JSON text
pub fn text(object: &Map<String, Value>, key: &str) -> Field<String> {
    match raw(object, key) {
        Field::Present(Value::String(s)) => Field::Present(s.clone()),
        Field::Present(Value::Number(n)) => Field::Present(n.to_string()),
        Field::Present(Value::Bool(b)) => Field::Present(b.to_string()),
        Field::Present(other) => Field::Mismatch(type_name(other)),
        Field::Absent => Field::Absent,
        Field::Null => Field::Null,
        Field::Mismatch(found) => Field::Mismatch(found),
    }
}

/// Reads an array
pub fn array<'a>(object: &'a Map<String, Value>, key: &str) -> Field<&'a Vec<Value>> {
    match raw(object, key) {
        Field::Present(Value::Array(items)) => Field::Present(items),
        Field::Present(other) => Field::Mismatch(type_name(other)),
        Field::Absent => Field::Absent,
        Field::Null => Field::Null,
        Field::Mismatch(found) => Field::Mismatch(found),
    }
}

/// Reads a nested object
pub fn object<'a>(object: &'a Map<String, Value>, key: &str) -> Field<&'a Map<String, Value>> {
    match raw(object, key) {
        Field::Present(Value::Object(inner)) => Field::Present(inner),
        Field::Present(other) => Field::Mismatch(type_name(other)),
        Field::Absent => Field::Absent,
        Field::Null => Field::Null,
        Field::Mismatch(found) => Field::Mismatch(found),
    }
}
