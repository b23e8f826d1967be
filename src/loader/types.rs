//! Loader types
//!
//! Declarative source definition types for YAML/JSON parsing.

use crate::auth::Auth;
use crate::config::ConfigDeclaration;
use crate::decode::{DecoderConfig, DecoderFormat};
use crate::http::HttpRequest;
use crate::pagination::PaginationConfig;
use crate::source::{Source, SourceBuilder};
use crate::stream::{RestStream, Stream, StreamInfo};
use crate::types::{JsonValue, Method, StringMap};
use serde::{Deserialize, Serialize};

// ============================================================================
// Source Definition
// ============================================================================

/// Top-level source definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceDefinition {
    /// Source name
    pub name: String,
    /// Source-wide config keys
    #[serde(default)]
    pub configs: Vec<ConfigDefinition>,
    /// Auth methods in preference order (no auth if empty)
    #[serde(default)]
    pub auths: Vec<Auth>,
    /// Stream definitions
    pub streams: Vec<StreamDefinition>,
}

impl SourceDefinition {
    /// Builder for the source this definition describes
    ///
    /// Registry and transport can still be set on the returned builder.
    pub fn builder(&self) -> SourceBuilder {
        let mut builder = Source::builder(&self.name);
        for config in &self.configs {
            builder = builder.config(config.to_declaration());
        }
        for auth in &self.auths {
            builder = builder.auth(*auth);
        }
        for stream in &self.streams {
            builder = builder.stream(stream.to_stream());
        }
        builder
    }
}

// ============================================================================
// Config Definition
// ============================================================================

/// Type of a declared config value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    /// Any string, optionally limited to `valid_values`
    #[default]
    String,
    /// Integer or numeric string
    Integer,
    /// Any number or numeric string
    Float,
    /// `true` / `false`
    Boolean,
}

/// Declared config key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfigDefinition {
    /// Dotted key
    pub key: String,
    /// Value type
    #[serde(default, rename = "type")]
    pub kind: ConfigType,
    /// Short alias, also usable in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_key: Option<String>,
    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    /// Redact the value in listings
    #[serde(default = "default_true")]
    pub secret: bool,
    /// Fail when no value resolves
    #[serde(default = "default_true")]
    pub required: bool,
    /// Allowed values (string keys only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl ConfigDefinition {
    /// Registry declaration for this key
    pub fn to_declaration(&self) -> ConfigDeclaration {
        let mut declaration = match self.kind {
            ConfigType::String => ConfigDeclaration::string(&self.key),
            ConfigType::Integer => ConfigDeclaration::integer(&self.key),
            ConfigType::Float => ConfigDeclaration::float(&self.key),
            ConfigType::Boolean => ConfigDeclaration::boolean(&self.key),
        }
        .secret(self.secret)
        .required(self.required);

        if let Some(alias) = &self.argument_key {
            declaration = declaration.with_argument_key(alias);
        }
        if let Some(default) = &self.default {
            declaration = declaration.with_default(default.clone());
        }
        if let Some(values) = &self.valid_values {
            declaration = declaration.with_valid_values(values.iter().cloned());
        }
        declaration
    }
}

// ============================================================================
// Stream Definition
// ============================================================================

/// Stream definition; without `request` the stream is metadata only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamDefinition {
    /// Stream name (unique within the source)
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Group shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Output schema (JSON Schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonValue>,
    /// Body format
    #[serde(default)]
    pub format: DecoderFormat,
    /// Path of the records within each response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_path: Option<String>,
    /// Request template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestDefinition>,
    /// Pagination
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Config keys read by this stream's template
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigDefinition>,
}

impl StreamDefinition {
    /// Metadata of this stream
    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            output_schema: self.schema.clone(),
            group: self.group.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Build the stream
    pub fn to_stream(&self) -> Stream {
        let Some(request) = &self.request else {
            return Stream::Base(self.info());
        };

        let decoder = DecoderConfig {
            format: self.format,
            records_path: self.records_path.clone(),
        };
        let rest = self
            .configs
            .iter()
            .fold(RestStream::new(self.info(), request.to_request()), |rest, config| {
                rest.with_config(config.to_declaration())
            })
            .with_decoder(decoder)
            .with_pagination(self.pagination.clone());

        Stream::Rest(rest)
    }
}

/// Request template definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestDefinition {
    /// HTTP method
    #[serde(default)]
    pub method: Method,
    /// URL template
    pub url: String,
    /// Header templates
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub headers: StringMap,
    /// Query parameter templates
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub params: StringMap,
    /// JSON body template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

impl RequestDefinition {
    /// Unrendered request
    pub fn to_request(&self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
        }
    }
}
