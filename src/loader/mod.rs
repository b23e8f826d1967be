//! Source definition loader
//!
//! Parse source definitions from YAML or JSON files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `SourceDefinition` - Declarative source definition
//! - `StreamDefinition` - Stream metadata, request template and pagination
//! - `ConfigDefinition` - Typed config keys
//! - Parsing with validation (schemas, templates, defaults)

mod parser;
mod types;

pub use parser::{load_source, load_source_from_str};
pub use types::{
    ConfigDefinition, ConfigType, RequestDefinition, SourceDefinition, StreamDefinition,
};

#[cfg(test)]
mod tests;
