//! Input types

use super::reader::{read_json_lines_file, read_structured_file};
use crate::error::{Error, Result};
use crate::types::{JsonValue, ValueMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which input a value or entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Global config file
    Config,
    /// Catalog of streams to fetch
    Catalog,
    /// Runtime state, highest precedence
    State,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Config => write!(f, "config"),
            InputKind::Catalog => write!(f, "catalog"),
            InputKind::State => write!(f, "state"),
        }
    }
}

// ============================================================================
// Config Input
// ============================================================================

/// Global config input: a flat mapping of dotted keys (or aliases) to values
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    values: ValueMap,
    path: Option<PathBuf>,
}

impl ConfigInput {
    /// Create a config input from an in-memory map
    pub fn new(values: ValueMap) -> Self {
        Self { values, path: None }
    }

    /// Create a config input from a JSON value, which must be an object
    pub fn from_value(value: JsonValue) -> Result<Self> {
        Self::from_value_at(value, None)
    }

    /// Load a config input from a JSON or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = read_structured_file(path)?;
        Self::from_value_at(value, Some(path))
    }

    fn from_value_at(value: JsonValue, path: Option<&Path>) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
                path: path.map(Path::to_path_buf),
            }),
            other => Err(Error::invalid_input(
                InputKind::Config,
                path,
                format!("expected an object, got {}", crate::types::json_type_name(&other)),
            )),
        }
    }

    /// Get a raw value by key
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Set a raw value
    pub fn put(&mut self, key: impl Into<String>, value: JsonValue) {
        self.values.insert(key.into(), value);
    }

    /// All raw values
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// File the input was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

// ============================================================================
// Catalog / State Input
// ============================================================================

/// One line of a catalog or state file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream name
    pub name: String,
    /// Per-stream config overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configs: Option<ValueMap>,
}

impl CatalogEntry {
    /// Create an entry without overrides
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configs: None,
        }
    }

    /// Create an entry with overrides
    pub fn with_configs(name: impl Into<String>, configs: ValueMap) -> Self {
        Self {
            name: name.into(),
            configs: Some(configs),
        }
    }
}

/// JSON-lines input (catalog or state) with its current overlay
#[derive(Debug, Clone)]
pub struct LinesInput {
    kind: InputKind,
    entries: Vec<CatalogEntry>,
    path: Option<PathBuf>,
    overlay: Option<ValueMap>,
}

impl LinesInput {
    /// Create an input from already-parsed entries
    pub fn new(kind: InputKind, entries: Vec<CatalogEntry>) -> Self {
        Self {
            kind,
            entries,
            path: None,
            overlay: None,
        }
    }

    /// Create an input from raw JSON records, validating each one
    pub fn from_values(kind: InputKind, values: Vec<JsonValue>) -> Result<Self> {
        Self::from_values_at(kind, values, None)
    }

    /// Load an input from a JSON-lines file
    pub fn from_file(kind: InputKind, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let values = read_json_lines_file(path)?;
        Self::from_values_at(kind, values, Some(path))
    }

    fn from_values_at(kind: InputKind, values: Vec<JsonValue>, path: Option<&Path>) -> Result<Self> {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<CatalogEntry>(value).map_err(|e| {
                    Error::invalid_input(kind, path, format!("entry {}: {e}", index + 1))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind,
            entries,
            path: path.map(Path::to_path_buf),
            overlay: None,
        })
    }

    /// Which input this is
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Entries in file order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// First entry with the given stream name
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// File the input was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current stream overlay
    pub fn overlay(&self) -> Option<&ValueMap> {
        self.overlay.as_ref()
    }

    /// Install the configs of the entry being processed
    pub fn set_overlay(&mut self, configs: ValueMap) {
        self.overlay = Some(configs);
    }

    /// Clear the overlay after an entry has been processed
    pub fn reset_overlay(&mut self) {
        self.overlay = None;
    }
}

// ============================================================================
// Runtime Inputs
// ============================================================================

/// All inputs of the current run
#[derive(Debug, Clone, Default)]
pub struct RuntimeInputs {
    /// Global config
    pub config: Option<ConfigInput>,
    /// Catalog of streams to fetch
    pub catalog: Option<LinesInput>,
    /// Runtime state
    pub state: Option<LinesInput>,
}

impl RuntimeInputs {
    /// Lines input of the given kind, if loaded
    pub fn lines(&self, kind: InputKind) -> Option<&LinesInput> {
        match kind {
            InputKind::Catalog => self.catalog.as_ref(),
            InputKind::State => self.state.as_ref(),
            InputKind::Config => None,
        }
    }

    /// Mutable lines input of the given kind, if loaded
    pub fn lines_mut(&mut self, kind: InputKind) -> Option<&mut LinesInput> {
        match kind {
            InputKind::Catalog => self.catalog.as_mut(),
            InputKind::State => self.state.as_mut(),
            InputKind::Config => None,
        }
    }
}
