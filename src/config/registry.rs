//! Config registry
//!
//! Owns every registered declaration together with the runtime inputs
//! and resolves values through the scope chain
//! state overlay > catalog overlay > config input > environment > default.

use super::declaration::{ConfigDeclaration, ConfigDescription};
use super::overlay::OverlayGuard;
use crate::error::{Error, Result};
use crate::input::{CatalogEntry, ConfigInput, InputKind, LinesInput, RuntimeInputs};
use crate::types::{JsonValue, ValueMap};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Output format key
pub const OUTPUT_FORMAT: &str = "brook.output.format";
/// Output destination key
pub const OUTPUT_TO: &str = "brook.output.to";
/// Schema enforcement key
pub const SCHEMA_VALIDATION: &str = "brook.output.enable_schema_validation";

/// Declarations every registry starts with
pub fn builtin_declarations() -> Vec<ConfigDeclaration> {
    vec![
        ConfigDeclaration::string(OUTPUT_FORMAT)
            .with_default("jsonlines")
            .with_valid_values(["json", "jsonlines"])
            .secret(false),
        ConfigDeclaration::string(OUTPUT_TO)
            .with_default("stdout")
            .with_valid_values(["stdout"])
            .secret(false),
        ConfigDeclaration::boolean(SCHEMA_VALIDATION)
            .with_default(true)
            .secret(false),
    ]
}

/// Source of environment variables
#[derive(Debug, Clone, Default)]
pub enum Environment {
    /// The process environment
    #[default]
    Process,
    /// A fixed set of variables
    Fixed(HashMap<String, String>),
}

impl Environment {
    /// Fixed environment from name/value pairs
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Environment::Process => std::env::var(name).ok(),
            Environment::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// Scope a value was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Per-stream state overlay
    State,
    /// Per-stream catalog overlay
    Catalog,
    /// Application config input
    Config,
    /// Environment variable named like the alias or key
    Environment,
    /// Declared default
    Default,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::State => "state",
            Scope::Catalog => "catalog",
            Scope::Config => "config",
            Scope::Environment => "environment",
            Scope::Default => "default",
        };
        f.write_str(name)
    }
}

/// Registry of config declarations and runtime inputs
///
/// Shared between the source, its streams and auth methods through an
/// `Arc`. Locks are only held for the duration of a lookup.
pub struct ConfigRegistry {
    declarations: RwLock<Vec<ConfigDeclaration>>,
    inputs: RwLock<RuntimeInputs>,
    environment: RwLock<Environment>,
}

impl ConfigRegistry {
    /// Create a registry with the built-in declarations, reading the
    /// process environment
    pub fn new() -> Self {
        Self::with_environment(Environment::Process)
    }

    /// Create a registry with the built-in declarations and the given
    /// environment
    pub fn with_environment(environment: Environment) -> Self {
        Self {
            declarations: RwLock::new(builtin_declarations()),
            inputs: RwLock::new(RuntimeInputs::default()),
            environment: RwLock::new(environment),
        }
    }

    /// Replace the environment
    pub fn set_environment(&self, environment: Environment) {
        *write(&self.environment) = environment;
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Register a declaration
    ///
    /// Fails if its key or alias is already used by another declaration,
    /// as either a key or an alias.
    pub fn register(&self, declaration: ConfigDeclaration) -> Result<()> {
        let mut declarations = write(&self.declarations);
        if declarations.iter().any(|d| d.collides_with(&declaration)) {
            return Err(Error::ConfigAlreadySupported {
                key: declaration.key().to_string(),
                argument_key: declaration.argument_key().map(str::to_string),
            });
        }

        debug!(key = declaration.key(), "Registered config");
        declarations.push(declaration);
        Ok(())
    }

    /// Register a declaration unless an identical one exists
    ///
    /// Auth methods shared by several sources declare the same keys; those
    /// are registered once. A declaration with the same key and alias but
    /// a different kind, default or flags is a conflict.
    pub fn ensure_registered(&self, declaration: ConfigDeclaration) -> Result<()> {
        let existing = read(&self.declarations)
            .iter()
            .find(|d| {
                d.key() == declaration.key() && d.argument_key() == declaration.argument_key()
            })
            .map(|d| d.is_equivalent(&declaration));

        match existing {
            Some(true) => Ok(()),
            Some(false) => Err(Error::ConfigAlreadySupported {
                key: declaration.key().to_string(),
                argument_key: declaration.argument_key().map(str::to_string),
            }),
            None => self.register(declaration),
        }
    }

    /// Check if a key or alias is registered
    pub fn is_registered(&self, key: &str) -> bool {
        read(&self.declarations).iter().any(|d| d.matches(key))
    }

    /// Look up a declaration by key or alias
    pub fn declaration(&self, key: &str) -> Result<ConfigDeclaration> {
        read(&self.declarations)
            .iter()
            .find(|d| d.matches(key))
            .cloned()
            .ok_or_else(|| Error::not_supported(key))
    }

    /// All declarations in registration order
    pub fn declarations(&self) -> Vec<ConfigDeclaration> {
        read(&self.declarations).clone()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve a value through the scope chain and validate it
    ///
    /// Returns `Ok(None)` for an optional key without any value.
    pub fn resolve(&self, key: &str) -> Result<Option<JsonValue>> {
        let declaration = self.declaration(key)?;
        let found = self.lookup(&declaration);
        declaration.validate(found)
    }

    /// Resolve a value that must be present
    pub fn resolve_or_error(&self, key: &str) -> Result<JsonValue> {
        let declaration = self.declaration(key)?;
        let Some(value) = self.lookup(&declaration) else {
            return Err(Error::not_found(declaration.key()));
        };
        declaration
            .validate(Some(value))?
            .ok_or_else(|| Error::not_found(declaration.key()))
    }

    /// Resolve a value as a string
    pub fn resolve_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.resolve(key)?.map(|value| match value {
            JsonValue::String(s) => s,
            other => other.to_string(),
        }))
    }

    /// Resolve a boolean value
    pub fn resolve_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.resolve(key)? {
            None => Ok(None),
            Some(JsonValue::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(Error::type_invalid(
                key,
                "boolean",
                crate::types::json_type_name(&other),
            )),
        }
    }

    /// Resolve an integer value
    pub fn resolve_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.resolve(key)? {
            None => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                Error::type_invalid(key, "integer", crate::types::json_type_name(&value))
            }),
        }
    }

    /// Describe a single key with its resolved (possibly redacted) value
    pub fn describe(&self, key: &str) -> Result<ConfigDescription> {
        let declaration = self.declaration(key)?;
        self.describe_declaration(&declaration)
    }

    /// Describe every registered key
    pub fn describe_all(&self) -> Result<Vec<ConfigDescription>> {
        self.declarations()
            .iter()
            .map(|d| self.describe_declaration(d))
            .collect()
    }

    fn describe_declaration(&self, declaration: &ConfigDeclaration) -> Result<ConfigDescription> {
        // Missing required values and disallowed values are shown as null;
        // a value of the wrong type is an error
        let value = match declaration.validate(self.lookup(declaration)) {
            Ok(value) => value,
            Err(Error::ConfigValueInvalid { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(declaration.describe(value))
    }

    fn lookup(&self, declaration: &ConfigDeclaration) -> Option<JsonValue> {
        let names = declaration.lookup_names();
        let found = self
            .lookup_inputs(&names)
            .or_else(|| self.lookup_environment(&names))
            .or_else(|| {
                declaration
                    .default_value()
                    .cloned()
                    .map(|value| (value, Scope::Default))
            })?;

        trace!(key = declaration.key(), scope = %found.1, "Resolved config");
        Some(found.0)
    }

    fn lookup_environment(&self, names: &[&str]) -> Option<(JsonValue, Scope)> {
        let environment = read(&self.environment);
        let value = names.iter().find_map(|name| environment.get(name))?;
        Some((JsonValue::String(value), Scope::Environment))
    }

    fn lookup_inputs(&self, names: &[&str]) -> Option<(JsonValue, Scope)> {
        let inputs = read(&self.inputs);

        let overlay = |lines: Option<&LinesInput>| {
            lines
                .and_then(LinesInput::overlay)
                .and_then(|map| first_present(map, names))
        };

        overlay(inputs.state.as_ref())
            .map(|v| (v, Scope::State))
            .or_else(|| overlay(inputs.catalog.as_ref()).map(|v| (v, Scope::Catalog)))
            .or_else(|| {
                inputs
                    .config
                    .as_ref()
                    .and_then(|config| first_present(config.values(), names))
                    .map(|v| (v, Scope::Config))
            })
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Replace the config input
    pub fn set_config(&self, config: Option<ConfigInput>) {
        write(&self.inputs).config = config;
    }

    /// Set a single raw value in the config input, creating it if needed
    pub fn put_config(&self, key: impl Into<String>, value: JsonValue) {
        write(&self.inputs)
            .config
            .get_or_insert_with(ConfigInput::default)
            .put(key, value);
    }

    /// Replace the catalog input
    pub fn set_catalog(&self, catalog: Option<LinesInput>) {
        write(&self.inputs).catalog = catalog;
    }

    /// Replace the state input
    pub fn set_state(&self, state: Option<LinesInput>) {
        write(&self.inputs).state = state;
    }

    /// Check if an input is loaded
    pub fn has_input(&self, kind: InputKind) -> bool {
        let inputs = read(&self.inputs);
        match kind {
            InputKind::Config => inputs.config.is_some(),
            other => inputs.lines(other).is_some(),
        }
    }

    /// Entries of the catalog input
    pub fn catalog_entries(&self) -> Result<Vec<CatalogEntry>> {
        read(&self.inputs)
            .catalog
            .as_ref()
            .map(|catalog| catalog.entries().to_vec())
            .ok_or(Error::CatalogInputRequired)
    }

    /// State entry for a stream, if a state input is loaded and has one
    pub fn state_entry(&self, name: &str) -> Option<CatalogEntry> {
        read(&self.inputs)
            .state
            .as_ref()
            .and_then(|state| state.entry(name).cloned())
    }

    /// Install a stream overlay on the catalog or state input
    ///
    /// The overlay stays in effect until the returned guard is dropped.
    pub fn install_overlay(&self, kind: InputKind, configs: ValueMap) -> Result<OverlayGuard<'_>> {
        let mut inputs = write(&self.inputs);
        let Some(lines) = inputs.lines_mut(kind) else {
            return Err(match kind {
                InputKind::Catalog => Error::CatalogInputRequired,
                InputKind::State => Error::StateInputRequired,
                InputKind::Config => Error::config("the config input has no stream overlay"),
            });
        };

        debug!(input = %kind, keys = configs.len(), "Installing stream overlay");
        lines.set_overlay(configs);
        Ok(OverlayGuard::new(self, kind))
    }

    /// Current overlay of an input
    pub fn overlay(&self, kind: InputKind) -> Option<ValueMap> {
        read(&self.inputs)
            .lines(kind)
            .and_then(LinesInput::overlay)
            .cloned()
    }

    pub(super) fn reset_overlay(&self, kind: InputKind) {
        if let Some(lines) = write(&self.inputs).lines_mut(kind) {
            lines.reset_overlay();
        }
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = read(&self.declarations)
            .iter()
            .map(|d| d.key().to_string())
            .collect();
        f.debug_struct("ConfigRegistry").field("keys", &keys).finish()
    }
}

fn first_present(map: &ValueMap, names: &[&str]) -> Option<JsonValue> {
    names
        .iter()
        .find_map(|name| map.get(*name).filter(|v| !v.is_null()).cloned())
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
