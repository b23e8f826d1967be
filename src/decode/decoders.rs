//! Decoder implementations and path extraction

use super::types::{DecoderConfig, DecoderFormat, RecordDecoder};
use crate::error::{Error, Result};
use serde_json::Value;

/// Build the decoder for a config
pub fn decoder_for(config: &DecoderConfig) -> Box<dyn RecordDecoder> {
    match config.format {
        DecoderFormat::Json => Box::new(JsonDecoder {
            records_path: config.records_path.clone(),
        }),
        DecoderFormat::Jsonl => Box::new(JsonlDecoder),
    }
}

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder with optional records path
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    records_path: Option<String>,
}

impl JsonDecoder {
    /// Create a JSON decoder yielding the whole body
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON decoder yielding the part of the body at `path`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            records_path: Some(path.into()),
        }
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value> {
        let value: Value = serde_json::from_slice(body)?;
        match &self.records_path {
            // A missing path yields an empty page
            Some(path) => Ok(extract_path(&value, path)?.unwrap_or(Value::Array(Vec::new()))),
            None => Ok(value),
        }
    }
}

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder, yielding an array with one element per line
#[derive(Debug, Clone, Default)]
pub struct JsonlDecoder;

impl RecordDecoder for JsonlDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value> {
        let text = std::str::from_utf8(body)
            .map_err(|e| Error::decode(format!("body is not valid UTF-8: {e}")))?;

        let mut records = Vec::new();
        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                Error::decode(format!("invalid JSONL at line {}: {e}", line_num + 1))
            })?;
            records.push(value);
        }

        Ok(Value::Array(records))
    }
}

// ============================================================================
// Path Extraction
// ============================================================================

/// Extract the value at a path
///
/// Dot paths with optional indexes (`data.items`, `$.items[0]`,
/// `items[-1]`) are walked directly; anything else (wildcards, recursive
/// descent, filters) goes through JSONPath and yields the array of matches.
pub fn extract_path(value: &Value, path: &str) -> Result<Option<Value>> {
    if is_simple_path(path) {
        return Ok(extract_simple_path(value, path));
    }

    match extract_with_jsonpath(value, path)? {
        Value::Null => Ok(None),
        Value::Array(found) if found.is_empty() => Ok(None),
        found => Ok(Some(found)),
    }
}

/// Extract a scalar at a path as a string
///
/// Null, empty strings, arrays and objects yield `None`.
pub fn extract_string(value: &Value, path: &str) -> Result<Option<String>> {
    let found = match extract_path(value, path)? {
        // A single JSONPath match
        Some(Value::Array(mut items)) if items.len() == 1 && !is_simple_path(path) => items.pop(),
        other => other,
    };

    Ok(match found {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn is_simple_path(path: &str) -> bool {
    !path.contains('*') && !path.contains("..") && !path.contains('?') && !path.contains('@')
}

/// Walk a dot path with optional `[n]` indexes (negative counts from the end)
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        let (name, indexes) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if !name.is_empty() {
            current = current.get(name)?;
        }

        for index in indexes
            .split(']')
            .filter_map(|s| s.strip_prefix('['))
        {
            let index: i64 = index.trim().parse().ok()?;
            let items = current.as_array()?;
            let position = if index < 0 {
                items.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                index as usize
            };
            current = items.get(position)?;
        }
    }

    Some(current.clone())
}

/// Extract matches using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Value> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    Ok(jp.find(value))
}
