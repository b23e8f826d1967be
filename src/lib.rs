// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # Brook Connector Development Kit (CDK)
//!
//! A small framework for building data sources that pull records out of
//! HTTP APIs and write them as JSON.
//!
//! ## Features
//!
//! - **Declarative sources**: describe configs, auths and streams in YAML
//! - **Typed config registry**: state > catalog > config > env > default
//! - **Auth**: none, HTTP Basic, Bearer token
//! - **Pagination**: page number, offset, cursor, next URL, link header, or any closure
//! - **Output**: JSON lines or a JSON array, checked against each stream's schema
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brook_cdk::{load_source, output::CollectingSink, FetchOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = load_source("sources/issues.yaml")?.builder().build()?;
//!
//!     let mut sink = CollectingSink::default();
//!     let stats = source
//!         .fetch_stream("issues", FetchOptions::new().with_limit(2), &mut sink)
//!         .await?;
//!     println!("{} records", stats.records_fetched);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Source                                 │
//! │  fetch_stream(name) / fetch_all(catalog) → RecordSink           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Config  │   Auth    │   Paginate    │  Schema   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Registry │ None      │ Page Number   │ Types     │ JSON lines  │
//! │ Overlays │ Basic     │ Offset/Cursor │ Required  │ JSON array  │
//! │ Env      │ Bearer    │ Link Header   │ Enum      │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the CDK
pub mod error;

/// Common types and type aliases
pub mod types;

/// Config, catalog and state inputs
pub mod input;

/// Typed config registry
pub mod config;

/// `{placeholder}` rendering
pub mod template;

/// Authentication methods
pub mod auth;

/// HTTP request/response types and transport
pub mod http;

/// JSON schema validation
pub mod schema;

/// Response decoders
pub mod decode;

/// Pagination strategies
pub mod pagination;

/// Stream definitions
pub mod stream;

/// Page fetching state machine
pub mod engine;

/// Record output
pub mod output;

/// Sources: streams, auths and configs bound to a registry
pub mod source;

/// YAML loader for source definitions
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::Auth;
pub use config::{ConfigDeclaration, ConfigRegistry};
pub use engine::{FetchOptions, FetchStats};
pub use http::{HttpRequest, HttpResponse};
pub use loader::{load_source, load_source_from_str, SourceDefinition};
pub use source::{Source, SourceBuilder};
pub use stream::{RestStream, Stream, StreamInfo};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
