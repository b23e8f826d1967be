//! Error types for Brook CDK
//!
//! This module defines the error hierarchy for the entire CDK.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for Brook CDK
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Config Registry Errors
    // ============================================================================
    /// A key was read that no registered declaration covers
    #[error("Config '{key}' is not supported by application.")]
    ConfigNotSupported {
        /// Requested key
        key: String,
    },

    /// No scope holds a value for the key and it has no default
    #[error("Config '{key}' not provided.")]
    ConfigNotFound {
        /// Requested key
        key: String,
    },

    /// The resolved value cannot be coerced to the declared kind
    #[error("Provided config '{key}' is of invalid type. Expected type is '{expected}' but actual type is '{actual}'.")]
    ConfigTypeInvalid {
        /// Config key
        key: String,
        /// Declared kind
        expected: String,
        /// JSON type of the provided value
        actual: String,
    },

    /// The value has the right type but fails the declaration's checks
    #[error("Provided value for config '{key}' is invalid. {message}")]
    ConfigValueInvalid {
        /// Config key
        key: String,
        /// Validator message
        message: String,
    },

    /// Registering a declaration that clashes with an existing one
    #[error("Config with key '{key}' or argument key '{}' is already present.", .argument_key.as_deref().unwrap_or("<none>"))]
    ConfigAlreadySupported {
        /// Key of the rejected declaration
        key: String,
        /// Alias of the rejected declaration
        argument_key: Option<String>,
    },

    /// Invalid source composition (duplicate stream names, bad definitions)
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    // ============================================================================
    // Input Errors
    // ============================================================================
    /// A config, catalog or state input could not be read
    #[error("Input is invalid for {kind}{}: {message}", .path.as_deref().map(|p| format!(" : {p}")).unwrap_or_default())]
    InvalidInput {
        /// `config`, `catalog` or `state`
        kind: String,
        /// File the input came from, if any
        path: Option<String>,
        /// Parse or shape failure
        message: String,
    },

    /// An operation needs catalog input that was not provided
    #[error("Catalog input is required for this operation.")]
    CatalogInputRequired,

    /// A state overlay was requested without state input
    #[error("State input is required for this operation.")]
    StateInputRequired,

    /// Malformed YAML
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Source / Stream Errors
    // ============================================================================
    /// The requested stream is not part of the source
    #[error("Stream '{stream}' is not supported. Supported streams are {supported:?}")]
    StreamNotSupported {
        /// Requested name
        stream: String,
        /// Names the source does have
        supported: Vec<String>,
    },

    /// A Base stream was asked to fetch
    #[error("Stream '{stream}' does not implement fetching.")]
    FetchNotImplemented {
        /// Stream name
        stream: String,
    },

    /// Schema validation is enforced but the stream has none
    #[error("Stream '{stream}' does not have an output schema for validation.")]
    MissingOutputSchema {
        /// Stream name
        stream: String,
    },

    /// A record, or the schema itself, failed validation
    #[error("Output schema validation failed for stream '{stream}': {message}")]
    OutputSchemaInvalid {
        /// Stream name
        stream: String,
        /// Joined violations
        message: String,
    },

    /// The server answered with a non-success status
    #[error("Stream '{stream}' has invalid response. [Status '{status} - {reason}' for url '{url}']")]
    ResponseStatusInvalid {
        /// Stream name
        stream: String,
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
        /// Final request URL
        url: String,
    },

    /// The body could not be decoded in the stream's format
    #[error("Stream '{stream}' has invalid content in response: {message}")]
    ResponseContentInvalid {
        /// Stream name
        stream: String,
        /// Decoder message
        message: String,
    },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    /// None of the source's auth methods has its configs available
    #[error("Auth cannot be performed. All available auth methods {methods:?} were unsuccessful.")]
    AuthCannotBePerformed {
        /// Methods that were tried, in order
        methods: Vec<String>,
    },

    /// `brook.auth.enforce` names a method the source does not declare
    #[error("Selected auth '{method}' is not available for source.")]
    EnforcedAuthNotSupported {
        /// Enforced method name
        method: String,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Transport failure from reqwest
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be read
    #[error("Failed to read response body from '{url}': {message}")]
    BodyRead {
        /// Request URL
        url: String,
        /// Underlying failure
        message: String,
    },

    /// Unparseable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    /// Bad JSONPath expression or lookup
    #[error("JSONPath error: {message}")]
    JsonPath {
        /// What failed
        message: String,
    },

    /// A body did not match the stream's decoder format
    #[error("Failed to decode body: {message}")]
    Decode {
        /// What failed
        message: String,
    },

    /// Placeholder rendering failed
    #[error("Template error: {message}")]
    Template {
        /// What failed
        message: String,
    },

    /// Writing records failed
    #[error("Output error: {message}")]
    Output {
        /// What failed
        message: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// Filesystem or stdout failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input or source file does not exist
    #[error("File not found: {path}")]
    FileNotFound {
        /// Missing path
        path: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Free-form error
    #[error("{0}")]
    Other(String),

    /// Error raised by user code through anyhow
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config (composition) error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not-supported error for an unknown config key
    pub fn not_supported(key: impl Into<String>) -> Self {
        Self::ConfigNotSupported { key: key.into() }
    }

    /// Create a not-found error for a config key without any value
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::ConfigNotFound { key: key.into() }
    }

    /// Create a value-invalid error
    pub fn value_invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValueInvalid {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a type-invalid error
    pub fn type_invalid(
        key: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigTypeInvalid {
            key: key.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(
        kind: impl std::fmt::Display,
        path: Option<&std::path::Path>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            kind: kind.to_string(),
            path: path.map(|p| p.display().to_string()),
            message: message.into(),
        }
    }

    /// Create a response content error
    pub fn response_content(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseContentInvalid {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a body decoding error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Check if this error means a body could not be decoded
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::JsonParse(_) | Error::Decode { .. })
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error was raised while resolving configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotSupported { .. }
                | Error::ConfigNotFound { .. }
                | Error::ConfigTypeInvalid { .. }
                | Error::ConfigValueInvalid { .. }
                | Error::ConfigAlreadySupported { .. }
        )
    }

    /// Check if this error aborts a single stream's pagination
    pub fn is_page_error(&self) -> bool {
        matches!(
            self,
            Error::ResponseStatusInvalid { .. }
                | Error::ResponseContentInvalid { .. }
                | Error::MissingOutputSchema { .. }
                | Error::OutputSchemaInvalid { .. }
        )
    }
}

/// Result type alias for Brook CDK
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
