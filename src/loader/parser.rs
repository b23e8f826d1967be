//! Parser for source definitions
//!
//! Parses and validates source definition files (YAML or JSON).

use crate::error::{Error, Result};
use crate::input::read_structured_file;
use crate::loader::types::{ConfigDefinition, ConfigType, SourceDefinition, StreamDefinition};
use crate::pagination::PaginationConfig;
use crate::schema::check_schema;
use crate::template::extract_placeholders;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Load a source definition from a YAML or JSON file
///
/// The format is picked from the extension; anything but `.yaml`/`.yml`
/// is read as JSON.
pub fn load_source(path: impl AsRef<Path>) -> Result<SourceDefinition> {
    let path = path.as_ref();
    let value = read_structured_file(path).map_err(|e| match e {
        Error::FileNotFound { .. } => e,
        other => Error::config(format!(
            "Failed to read source definition '{}': {other}",
            path.display()
        )),
    })?;

    let def: SourceDefinition = serde_json::from_value(value).map_err(|e| {
        Error::config(format!(
            "Invalid source definition '{}': {e}",
            path.display()
        ))
    })?;

    validate_source(&def)?;
    debug!(source = %def.name, path = %path.display(), "Loaded source definition");
    Ok(def)
}

/// Load a source definition from a YAML string (JSON is valid YAML)
pub fn load_source_from_str(content: &str) -> Result<SourceDefinition> {
    let def: SourceDefinition = serde_yaml::from_str(content)
        .map_err(|e| Error::config(format!("Failed to parse source definition: {e}")))?;

    validate_source(&def)?;
    Ok(def)
}

/// Validate a source definition
fn validate_source(def: &SourceDefinition) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(Error::config("Source name cannot be empty"));
    }

    if def.streams.is_empty() {
        return Err(Error::config(format!(
            "Source '{}' must have at least one stream",
            def.name
        )));
    }

    let mut names = HashSet::new();
    for stream in &def.streams {
        if !names.insert(stream.name.as_str()) {
            return Err(Error::config(format!(
                "Duplicate stream name '{}'",
                stream.name
            )));
        }
        validate_stream(stream)?;
    }

    for config in def
        .configs
        .iter()
        .chain(def.streams.iter().flat_map(|s| s.configs.iter()))
    {
        validate_config(config)?;
    }

    Ok(())
}

/// Validate a stream definition
fn validate_stream(stream: &StreamDefinition) -> Result<()> {
    if stream.name.trim().is_empty() {
        return Err(Error::config("Stream name cannot be empty"));
    }

    if let Some(schema) = &stream.schema {
        check_schema(schema).map_err(|violation| {
            Error::config(format!(
                "Stream '{}' has an invalid schema: {violation}",
                stream.name
            ))
        })?;
    }

    let Some(request) = &stream.request else {
        if stream.pagination != PaginationConfig::SinglePage {
            return Err(Error::config(format!(
                "Stream '{}' has pagination but no request",
                stream.name
            )));
        }
        return Ok(());
    };

    if request.url.trim().is_empty() {
        return Err(Error::config(format!(
            "Stream '{}' request url cannot be empty",
            stream.name
        )));
    }

    // Malformed placeholders fail here rather than on the first fetch
    let templates = std::iter::once(&request.url)
        .chain(request.headers.values())
        .chain(request.params.values());
    for template in templates {
        extract_placeholders(template).map_err(|e| {
            Error::config(format!("Stream '{}' has an invalid template: {e}", stream.name))
        })?;
    }

    Ok(())
}

/// Validate a config definition
fn validate_config(config: &ConfigDefinition) -> Result<()> {
    if config.key.trim().is_empty() {
        return Err(Error::config("Config key cannot be empty"));
    }

    if config.valid_values.is_some() && config.kind != ConfigType::String {
        return Err(Error::config(format!(
            "Config '{}' declares valid values but is not a string",
            config.key
        )));
    }

    if let Some(default) = &config.default {
        config
            .to_declaration()
            .validate(Some(default.clone()))
            .map_err(|e| {
                Error::config(format!("Config '{}' has an invalid default: {e}", config.key))
            })?;
    }

    Ok(())
}
