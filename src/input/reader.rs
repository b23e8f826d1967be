//! File readers for config, catalog and state inputs

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::fs;
use std::path::Path;

/// Read a JSON or YAML document, picking the format from the file extension
pub fn read_structured_file(path: &Path) -> Result<JsonValue> {
    let content = read_to_string(path)?;
    match extension(path).as_deref() {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
        _ => Ok(serde_json::from_str(&content)?),
    }
}

/// Read a JSON-lines file into one value per non-blank line
///
/// A `.json` file holding a single array is accepted as well.
pub fn read_json_lines_file(path: &Path) -> Result<Vec<JsonValue>> {
    let content = read_to_string(path)?;

    if extension(path).as_deref() == Some("json") && content.trim_start().starts_with('[') {
        return match serde_json::from_str(&content)? {
            JsonValue::Array(items) => Ok(items),
            _ => Err(Error::config(format!(
                "Expected a JSON array in '{}'",
                path.display()
            ))),
        };
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                Error::config(format!(
                    "Invalid JSON on line {} of '{}': {e}",
                    index + 1,
                    path.display()
                ))
            })
        })
        .collect()
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
