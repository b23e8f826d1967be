//! CLI module
//!
//! Command-line interface for running sources.
//!
//! # Commands
//!
//! - `fetch all` - Fetch every stream in the catalog file
//! - `fetch stream NAME` - Fetch one stream
//! - `list config` - List config keys and their resolved values
//! - `list stream` - List streams

mod commands;
mod runner;

pub use commands::{Cli, Commands, FetchArgs, FetchCommand, ListCommand};
pub use runner::Runner;
