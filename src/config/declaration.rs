//! Config declarations
//!
//! A declaration describes one configuration key: its type, default,
//! alias, secrecy and validation rule. Declarations are immutable once
//! registered.

use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonValue};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Placeholder reported instead of a secret value
pub const REDACTED: &str = "___REDACTED___";

/// Extra validation rule attached to a declaration
pub type Validator = Arc<dyn Fn(&JsonValue) -> std::result::Result<(), String> + Send + Sync>;

/// Declared type of a config value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKind {
    /// String, optionally restricted to a set of allowed values
    String {
        /// Allowed values (None = any string)
        valid_values: Option<Vec<String>>,
    },
    /// 64-bit signed integer
    Integer,
    /// Floating point number
    Float,
    /// Boolean (`true`/`false`, case-insensitive when given as a string)
    Boolean,
}

impl ConfigKind {
    /// Name used in type errors
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKind::String { .. } => "string",
            ConfigKind::Integer => "integer",
            ConfigKind::Float => "float",
            ConfigKind::Boolean => "boolean",
        }
    }
}

/// Typed configuration declaration
#[derive(Clone)]
pub struct ConfigDeclaration {
    key: String,
    kind: ConfigKind,
    default_value: Option<JsonValue>,
    argument_key: Option<String>,
    is_secret: bool,
    is_required: bool,
    validator: Option<Validator>,
}

impl ConfigDeclaration {
    /// Create a declaration of the given kind.
    ///
    /// Declarations are secret and required unless stated otherwise.
    pub fn new(key: impl Into<String>, kind: ConfigKind) -> Self {
        Self {
            key: key.into(),
            kind,
            default_value: None,
            argument_key: None,
            is_secret: true,
            is_required: true,
            validator: None,
        }
    }

    /// Create a string declaration
    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, ConfigKind::String { valid_values: None })
    }

    /// Create an integer declaration
    pub fn integer(key: impl Into<String>) -> Self {
        Self::new(key, ConfigKind::Integer)
    }

    /// Create a float declaration
    pub fn float(key: impl Into<String>) -> Self {
        Self::new(key, ConfigKind::Float)
    }

    /// Create a boolean declaration
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, ConfigKind::Boolean)
    }

    /// Set the default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the short alias accepted in every scope
    #[must_use]
    pub fn with_argument_key(mut self, argument_key: impl Into<String>) -> Self {
        self.argument_key = Some(argument_key.into());
        self
    }

    /// Mark the value as secret (redacted in descriptions)
    #[must_use]
    pub fn secret(mut self, is_secret: bool) -> Self {
        self.is_secret = is_secret;
        self
    }

    /// Mark the value as required
    #[must_use]
    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    /// Restrict a string declaration to the given values
    ///
    /// Has no effect on non-string declarations.
    #[must_use]
    pub fn with_valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ConfigKind::String { valid_values } = &mut self.kind {
            *valid_values = Some(values.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Attach an extra validation rule, run after type coercion
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&JsonValue) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Dotted config key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared value kind
    pub fn kind(&self) -> &ConfigKind {
        &self.kind
    }

    /// Value used when no scope provides one
    pub fn default_value(&self) -> Option<&JsonValue> {
        self.default_value.as_ref()
    }

    /// Alias looked up before the key
    pub fn argument_key(&self) -> Option<&str> {
        self.argument_key.as_deref()
    }

    /// Redacted in listings
    pub fn is_secret(&self) -> bool {
        self.is_secret
    }

    /// Listed by `--missing` when unresolved
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Allowed values for string declarations
    pub fn valid_values(&self) -> Option<&[String]> {
        match &self.kind {
            ConfigKind::String { valid_values } => valid_values.as_deref(),
            _ => None,
        }
    }

    /// Check if the given name is this declaration's key or alias
    pub fn matches(&self, name: &str) -> bool {
        self.key == name || self.argument_key.as_deref() == Some(name)
    }

    /// Names to look up in each scope: alias first, then key
    pub fn lookup_names(&self) -> Vec<&str> {
        self.argument_key
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.key.as_str()))
            .collect()
    }

    /// Check if two declarations would be ambiguous in the same registry
    pub fn collides_with(&self, other: &ConfigDeclaration) -> bool {
        other.matches(&self.key)
            || self
                .argument_key
                .as_deref()
                .is_some_and(|alias| other.matches(alias))
    }

    /// Check if two declarations describe the same key the same way
    ///
    /// Custom validators cannot be compared and are ignored.
    pub fn is_equivalent(&self, other: &ConfigDeclaration) -> bool {
        self.key == other.key
            && self.kind == other.kind
            && self.default_value == other.default_value
            && self.argument_key == other.argument_key
            && self.is_secret == other.is_secret
            && self.is_required == other.is_required
    }

    /// Validate a resolved value, returning it coerced to the declared kind
    pub fn validate(&self, value: Option<JsonValue>) -> Result<Option<JsonValue>> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            if self.is_required {
                return Err(Error::value_invalid(
                    &self.key,
                    "Given value is required, it cannot be null.",
                ));
            }
            return Ok(None);
        };

        let value = self.coerce(value)?;

        if let (Some(valid), Some(s)) = (self.valid_values(), value.as_str()) {
            if !valid.iter().any(|v| v == s) {
                return Err(Error::value_invalid(
                    &self.key,
                    format!("Provided value '{s}' is not one of {valid:?}."),
                ));
            }
        }

        if let Some(validator) = &self.validator {
            validator(&value).map_err(|message| Error::value_invalid(&self.key, message))?;
        }

        Ok(Some(value))
    }

    fn coerce(&self, value: JsonValue) -> Result<JsonValue> {
        let coerced = match (&self.kind, &value) {
            (ConfigKind::String { .. }, JsonValue::String(_)) => Some(value.clone()),
            (ConfigKind::String { .. }, JsonValue::Number(n)) => {
                Some(JsonValue::String(n.to_string()))
            }
            (ConfigKind::String { .. }, JsonValue::Bool(b)) => {
                Some(JsonValue::String(b.to_string()))
            }

            (ConfigKind::Integer, JsonValue::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(value.clone())
            }
            (ConfigKind::Integer, JsonValue::String(s)) => {
                s.trim().parse::<i64>().ok().map(JsonValue::from)
            }

            (ConfigKind::Float, JsonValue::Number(n)) => {
                n.as_f64().and_then(serde_json::Number::from_f64).map(JsonValue::Number)
            }
            (ConfigKind::Float, JsonValue::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number),

            (ConfigKind::Boolean, JsonValue::Bool(_)) => Some(value.clone()),
            (ConfigKind::Boolean, JsonValue::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(JsonValue::Bool(true)),
                "false" => Some(JsonValue::Bool(false)),
                _ => None,
            },

            _ => None,
        };

        coerced.ok_or_else(|| {
            Error::type_invalid(&self.key, self.kind.name(), json_type_name(&value))
        })
    }

    /// Describe this declaration with an already-resolved value
    pub fn describe(&self, value: Option<JsonValue>) -> ConfigDescription {
        let value = match value {
            Some(_) if self.is_secret => Some(JsonValue::String(REDACTED.to_string())),
            other => other,
        };

        ConfigDescription {
            key: self.key.clone(),
            value,
            argument_key: self.argument_key.clone(),
            default_value: self.default_value.clone(),
            is_secret: self.is_secret,
            is_required: self.is_required,
            valid_values: self.valid_values().map(<[String]>::to_vec),
        }
    }
}

impl fmt::Debug for ConfigDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDeclaration")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("default_value", &self.default_value)
            .field("argument_key", &self.argument_key)
            .field("is_secret", &self.is_secret)
            .field("is_required", &self.is_required)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Printable projection of a declaration and its resolved value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDescription {
    /// Config key
    pub key: String,
    /// Resolved value, redacted for secrets, `None` when unset or disallowed
    pub value: Option<JsonValue>,
    /// Alias, if any
    pub argument_key: Option<String>,
    /// Declared default
    pub default_value: Option<JsonValue>,
    /// Whether the value is redacted
    pub is_secret: bool,
    /// Whether the key must be provided
    pub is_required: bool,
    /// Allowed values of string declarations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<String>>,
}

impl ConfigDescription {
    /// Required but without any value
    pub fn is_missing(&self) -> bool {
        self.is_required && self.value.is_none()
    }

    /// One-line summary: `key [alias]`
    pub fn simple(&self) -> String {
        match &self.argument_key {
            Some(alias) => format!("{} [{alias}]", self.key),
            None => self.key.clone(),
        }
    }
}
