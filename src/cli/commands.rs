//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Brook Connector Development Kit CLI
#[derive(Parser, Debug)]
#[command(name = "brook-cdk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source definition file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch records from streams
    Fetch {
        /// What to fetch
        #[command(subcommand)]
        command: FetchCommand,
    },

    /// List configs or streams of the source
    List {
        /// What to list
        #[command(subcommand)]
        command: ListCommand,
    },
}

/// `fetch` subcommands
#[derive(Subcommand, Debug)]
pub enum FetchCommand {
    /// Fetch every stream listed in the catalog file
    All {
        /// Application configs file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Catalog file (JSON lines) listing the streams to fetch
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// State file (JSON lines) with per-stream overrides
        #[arg(long)]
        state: Option<PathBuf>,

        /// Page limit and dry run
        #[command(flatten)]
        options: FetchArgs,
    },

    /// Fetch a single stream
    Stream {
        /// Stream name
        name: String,

        /// Application configs file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Page limit and dry run
        #[command(flatten)]
        options: FetchArgs,
    },
}

/// Options shared by `fetch` subcommands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FetchArgs {
    /// Maximum number of pages per stream
    #[arg(long)]
    pub limit: Option<u64>,

    /// Prepare the first request of each stream without sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// `list` subcommands
#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// List every config key with its resolved value
    Config {
        /// Application configs file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only required keys without a value
        #[arg(long)]
        missing: bool,

        /// Only `key [alias]`
        #[arg(long)]
        simple: bool,
    },

    /// List every stream
    Stream {
        /// Application configs file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only names
        #[arg(long)]
        simple: bool,
    },
}
