//! Schema types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON Schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// `"string"`
    String,
    /// `"number"`, integers included
    Number,
    /// `"integer"`
    Integer,
    /// `"boolean"`
    Boolean,
    /// `"object"`
    Object,
    /// `"array"`
    Array,
    /// `"null"`
    Null,
}

impl JsonType {
    /// Most specific type of a value
    pub fn of(value: &JsonValue) -> JsonType {
        match value {
            JsonValue::Null => JsonType::Null,
            JsonValue::Bool(_) => JsonType::Boolean,
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            JsonValue::Number(_) => JsonType::Number,
            JsonValue::String(_) => JsonType::String,
            JsonValue::Array(_) => JsonType::Array,
            JsonValue::Object(_) => JsonType::Object,
        }
    }

    /// Check if a value is an instance of this type
    ///
    /// Integers are numbers, and numbers without a fractional part are
    /// integers.
    pub fn matches(&self, value: &JsonValue) -> bool {
        match (self, value) {
            (JsonType::Number, JsonValue::Number(_)) => true,
            (JsonType::Integer, JsonValue::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            (expected, value) => *expected == JsonType::of(value),
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// JSON type can be a single type or array of types (for nullable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    /// `"type": "string"`
    Single(JsonType),
    /// `"type": ["string", "null"]`
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// Parse the `type` keyword of a schema
    pub fn from_schema(value: &JsonValue) -> Result<Self, String> {
        serde_json::from_value(value.clone()).map_err(|_| format!("unknown type {value}"))
    }

    /// Check if a value is an instance of any of the types
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            JsonTypeOrArray::Single(t) => t.matches(value),
            JsonTypeOrArray::Multiple(types) => types.iter().any(|t| t.matches(value)),
        }
    }

    /// Check if this type is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            JsonTypeOrArray::Single(t) => *t == JsonType::Null,
            JsonTypeOrArray::Multiple(types) => types.contains(&JsonType::Null),
        }
    }
}

impl fmt::Display for JsonTypeOrArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonTypeOrArray::Single(t) => write!(f, "{t}"),
            JsonTypeOrArray::Multiple(types) => {
                let names: Vec<String> = types.iter().map(ToString::to_string).collect();
                write!(f, "one of [{}]", names.join(", "))
            }
        }
    }
}

/// First place an instance (or a schema) breaks the rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at '{path}'")]
pub struct SchemaViolation {
    /// Location as `$`, `$.field`, `$[0]`, ...
    pub path: String,
    /// What went wrong
    pub message: String,
}

impl SchemaViolation {
    /// Violation at `path`
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
