//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs, FetchCommand, ListCommand};
use crate::config::ConfigRegistry;
use crate::engine::FetchOptions;
use crate::error::{Error, Result};
use crate::input::{ConfigInput, InputKind, LinesInput};
use crate::loader::load_source;
use crate::output::{JsonOutput, OutputFormat, RecordSink};
use crate::source::{Source, SourceBuilder};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parsed arguments
    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Run the command against the source given with `--source`
    pub async fn run(&self) -> Result<()> {
        let path = self
            .cli
            .source
            .as_ref()
            .ok_or_else(|| Error::config("Source definition not specified (use --source)"))?;
        let definition = load_source(path)?;
        self.run_source(definition.builder()).await
    }

    /// Run the command against a programmatically built source
    ///
    /// The runner supplies the registry; one set on `builder` is replaced.
    pub async fn run_source(&self, builder: SourceBuilder) -> Result<()> {
        let source = self.build(builder)?;
        self.execute(&source, io::stdout()).await
    }

    /// Load the command's inputs into a fresh registry and build the source
    pub fn build(&self, builder: SourceBuilder) -> Result<Source> {
        let registry = Arc::new(ConfigRegistry::new());
        self.load_inputs(&registry)?;
        builder.registry(registry).build()
    }

    fn load_inputs(&self, registry: &ConfigRegistry) -> Result<()> {
        let (config, catalog, state) = match &self.cli.command {
            Commands::Fetch {
                command:
                    FetchCommand::All {
                        config,
                        catalog,
                        state,
                        ..
                    },
            } => (config, catalog.as_ref(), state.as_ref()),
            Commands::Fetch {
                command: FetchCommand::Stream { config, .. },
            }
            | Commands::List {
                command: ListCommand::Config { config, .. } | ListCommand::Stream { config, .. },
            } => (config, None, None),
        };

        if let Some(path) = config {
            debug!(path = %path.display(), "Loading config input");
            registry.set_config(Some(ConfigInput::from_file(path)?));
        }
        if let Some(path) = catalog {
            registry.set_catalog(Some(load_lines(InputKind::Catalog, path)?));
        }
        if let Some(path) = state {
            registry.set_state(Some(load_lines(InputKind::State, path)?));
        }
        Ok(())
    }

    /// Execute the command, writing records and listings to `out`
    pub async fn execute<W: Write + Send>(&self, source: &Source, mut out: W) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch { command } => {
                let format = OutputFormat::from_registry(source.registry())?;
                let mut output = JsonOutput::new(out, format);

                let (args, stats) = match command {
                    FetchCommand::All { options, .. } => {
                        (options, source.fetch_all(fetch_options(options), &mut output).await?)
                    }
                    FetchCommand::Stream { name, options, .. } => (
                        options,
                        source
                            .fetch_stream(name, fetch_options(options), &mut output)
                            .await?,
                    ),
                };

                if !args.dry_run {
                    output.finish()?;
                }
                info!(
                    pages = stats.pages_fetched,
                    records = stats.records_fetched,
                    "Fetch complete"
                );
            }
            Commands::List {
                command: ListCommand::Config {
                    missing, simple, ..
                },
            } => {
                for description in source.describe_configs()? {
                    if *missing && !description.is_missing() {
                        continue;
                    }
                    print_entry(&mut out, &description, *simple, || description.simple())?;
                }
                out.flush()?;
            }
            Commands::List {
                command: ListCommand::Stream { simple, .. },
            } => {
                for description in source.describe_streams() {
                    print_entry(&mut out, &description, *simple, || description.name.clone())?;
                }
                out.flush()?;
            }
        }

        Ok(())
    }
}

fn fetch_options(args: &FetchArgs) -> FetchOptions {
    FetchOptions {
        limit: args.limit,
        dry_run: args.dry_run,
    }
}

fn load_lines(kind: InputKind, path: &Path) -> Result<LinesInput> {
    debug!(input = %kind, path = %path.display(), "Loading input");
    LinesInput::from_file(kind, path)
}

fn print_entry<W, T, F>(out: &mut W, entry: &T, simple: bool, short: F) -> Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce() -> String,
{
    if simple {
        writeln!(out, "{}", short())?;
    } else {
        serde_json::to_writer(&mut *out, entry)?;
        writeln!(out)?;
    }
    Ok(())
}
