//! Decoder types and traits

use crate::error::Result;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Format of the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderFormat {
    /// A single JSON document (default)
    #[default]
    Json,
    /// JSON Lines, one document per line
    Jsonl,
}

/// Configuration for decoding responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Response format
    #[serde(default)]
    pub format: DecoderFormat,
    /// Path to the part of the body yielded as the page unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_path: Option<String>,
}

impl DecoderConfig {
    /// Create a JSON decoder config
    pub fn json() -> Self {
        Self::default()
    }

    /// Create a JSONL decoder config
    pub fn jsonl() -> Self {
        Self {
            format: DecoderFormat::Jsonl,
            ..Default::default()
        }
    }

    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }
}

/// Turns a response body into the unit yielded for a page
pub trait RecordDecoder: Send + Sync + Debug {
    /// Decode a response body
    ///
    /// Fails when the body is not valid for the format.
    fn decode(&self, body: &[u8]) -> Result<JsonValue>;
}
