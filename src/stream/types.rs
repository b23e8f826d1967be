//! Stream types

use crate::config::ConfigDeclaration;
use crate::decode::{decoder_for, DecoderConfig, RecordDecoder};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::pagination::{NextRequest, PaginationConfig, SinglePage};
use crate::types::{JsonValue, Method, StringMap};
use serde::Serialize;
use std::fmt;

// ============================================================================
// Stream Metadata
// ============================================================================

/// Metadata shared by every stream kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamInfo {
    /// Unique name within the source
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema every yielded page must satisfy
    pub output_schema: Option<JsonValue>,
    /// Optional grouping used in listings
    pub group: Option<String>,
    /// Free-form tags
    pub tags: Vec<String>,
}

impl StreamInfo {
    /// Create stream metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the output schema
    #[must_use]
    pub fn with_output_schema(mut self, schema: JsonValue) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Set the group
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

// ============================================================================
// REST Stream
// ============================================================================

/// Stream fetched page by page over HTTP
///
/// The request is a template: `{key}` placeholders in its URL, header
/// values, parameter values and body are filled from the config registry
/// each time a fetch starts. Nothing is kept between fetches.
pub struct RestStream {
    info: StreamInfo,
    request: HttpRequest,
    next_request: Box<dyn NextRequest>,
    pagination: Option<PaginationConfig>,
    decoder_config: DecoderConfig,
    decoder: Box<dyn RecordDecoder>,
    configs: Vec<ConfigDeclaration>,
}

impl RestStream {
    /// Create a single-page JSON stream
    pub fn new(info: StreamInfo, request: HttpRequest) -> Self {
        let decoder_config = DecoderConfig::default();
        Self {
            info,
            request,
            next_request: Box::new(SinglePage),
            pagination: None,
            decoder: decoder_for(&decoder_config),
            decoder_config,
            configs: Vec::new(),
        }
    }

    /// Paginate with one of the built-in strategies
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.next_request = pagination.build(&self.decoder_config);
        self.pagination = Some(pagination);
        self
    }

    /// Paginate with a custom hook
    #[must_use]
    pub fn with_next_request(mut self, hook: impl NextRequest + 'static) -> Self {
        self.next_request = Box::new(hook);
        self.pagination = None;
        self
    }

    /// Set how response bodies are decoded
    #[must_use]
    pub fn with_decoder(mut self, config: DecoderConfig) -> Self {
        self.decoder = decoder_for(&config);
        self.decoder_config = config;
        // Built-in strategies read pages the way the decoder does
        if let Some(pagination) = &self.pagination {
            self.next_request = pagination.build(&self.decoder_config);
        }
        self
    }

    /// Declare a config key read by this stream's request template
    #[must_use]
    pub fn with_config(mut self, declaration: ConfigDeclaration) -> Self {
        self.configs.push(declaration);
        self
    }

    /// Stream metadata
    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Request template
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Path of the records within each decoded body
    pub fn records_path(&self) -> Option<&str> {
        self.decoder_config.records_path.as_deref()
    }

    /// Decoder settings
    pub fn decoder_config(&self) -> &DecoderConfig {
        &self.decoder_config
    }

    /// Built-in pagination, if one is used
    pub fn pagination(&self) -> Option<&PaginationConfig> {
        self.pagination.as_ref()
    }

    /// Config keys declared by this stream
    pub fn configs(&self) -> &[ConfigDeclaration] {
        &self.configs
    }

    /// Ask the pagination hook for the request following `previous`
    pub fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        self.next_request.next_request(previous, response)
    }

    /// Decode a response body into the page unit
    pub fn decode(&self, body: &[u8]) -> Result<JsonValue> {
        self.decoder.decode(body)
    }
}

impl fmt::Debug for RestStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStream")
            .field("info", &self.info)
            .field("request", &self.request)
            .field("pagination", &self.pagination)
            .field("decoder", &self.decoder_config)
            .field("configs", &self.configs.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Stream
// ============================================================================

/// A stream of a source
#[derive(Debug)]
pub enum Stream {
    /// Metadata only, cannot be fetched
    Base(StreamInfo),
    /// Paginated HTTP stream
    Rest(RestStream),
}

impl Stream {
    /// Stream metadata
    pub fn info(&self) -> &StreamInfo {
        match self {
            Stream::Base(info) => info,
            Stream::Rest(rest) => rest.info(),
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.info().name
    }

    /// Config keys declared by this stream
    pub fn configs(&self) -> &[ConfigDeclaration] {
        match self {
            Stream::Base(_) => &[],
            Stream::Rest(rest) => rest.configs(),
        }
    }

    /// Listing projection of this stream
    pub fn describe(&self) -> StreamDescription {
        let info = self.info();
        StreamDescription {
            name: info.name.clone(),
            description: info.description.clone(),
            group: info.group.clone(),
            tags: info.tags.clone(),
            request: match self {
                Stream::Base(_) => None,
                Stream::Rest(rest) => Some(RequestDescription::from(rest.request())),
            },
        }
    }
}

impl From<StreamInfo> for Stream {
    fn from(info: StreamInfo) -> Self {
        Stream::Base(info)
    }
}

impl From<RestStream> for Stream {
    fn from(rest: RestStream) -> Self {
        Stream::Rest(rest)
    }
}

// ============================================================================
// Descriptions
// ============================================================================

/// Stream as shown by `list stream`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDescription {
    /// Unique stream name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Optional grouping label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Free-form labels
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Request template, absent for Base streams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestDescription>,
}

impl StreamDescription {
    /// One-line form: `name [group]`
    pub fn simple(&self) -> String {
        match &self.group {
            Some(group) => format!("{} [{group}]", self.name),
            None => self.name.clone(),
        }
    }
}

/// Request template of a REST stream, unrendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescription {
    /// HTTP method
    pub method: Method,
    /// URL template
    pub url: String,
    /// Header templates
    #[serde(skip_serializing_if = "StringMap::is_empty")]
    pub headers: StringMap,
    /// Query parameter templates
    #[serde(skip_serializing_if = "StringMap::is_empty")]
    pub params: StringMap,
}

impl From<&HttpRequest> for RequestDescription {
    fn from(request: &HttpRequest) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            params: request.params.clone(),
        }
    }
}
