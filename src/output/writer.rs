//! Record sinks

use crate::config::{ConfigRegistry, OUTPUT_FORMAT, OUTPUT_TO};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use tracing::debug;

/// Destination value of `brook.output.to` meaning standard output
pub const STDOUT: &str = "stdout";

/// Receives page units as they are fetched
pub trait RecordSink: Send {
    /// Write one page unit (a record object or an array of records)
    fn write(&mut self, unit: &JsonValue) -> Result<()>;

    /// Flush anything buffered; called once after the last unit
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Serialization format of [`JsonOutput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// A single JSON array of all records
    Json,
    /// One JSON document per line
    #[default]
    JsonLines,
}

impl OutputFormat {
    /// Name as used in `brook.output.format`
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::JsonLines => "jsonlines",
        }
    }

    /// Format configured in `brook.output.format`
    ///
    /// Also resolves `brook.output.to`, whose declaration only admits
    /// [`STDOUT`].
    pub fn from_registry(registry: &ConfigRegistry) -> Result<Self> {
        let destination = registry
            .resolve_string(OUTPUT_TO)?
            .unwrap_or_else(|| STDOUT.to_string());

        let format = match registry.resolve_string(OUTPUT_FORMAT)? {
            Some(name) => name.parse()?,
            None => OutputFormat::default(),
        };
        debug!(%format, %destination, "Output configured");
        Ok(format)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonlines" => Ok(OutputFormat::JsonLines),
            other => Err(Error::output(format!("Unsupported output format '{other}'"))),
        }
    }
}

/// JSON writer over any `io::Write`
pub struct JsonOutput<W: Write> {
    writer: W,
    format: OutputFormat,
    buffered: Vec<JsonValue>,
    records_written: usize,
}

impl<W: Write> JsonOutput<W> {
    /// Create a writer
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            buffered: Vec::new(),
            records_written: 0,
        }
    }

    /// Output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Number of records written or buffered so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Get the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, record: &JsonValue) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write + Send> RecordSink for JsonOutput<W> {
    fn write(&mut self, unit: &JsonValue) -> Result<()> {
        let records: &[JsonValue] = match unit {
            JsonValue::Array(items) => items,
            single => std::slice::from_ref(single),
        };
        self.records_written += records.len();

        match self.format {
            OutputFormat::JsonLines => {
                for record in records {
                    self.write_line(record)?;
                }
            }
            OutputFormat::Json => self.buffered.extend(records.iter().cloned()),
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.format == OutputFormat::Json {
            let records = JsonValue::Array(std::mem::take(&mut self.buffered));
            self.write_line(&records)?;
        }
        self.writer.flush()?;
        debug!(records = self.records_written, format = %self.format, "Output finished");
        Ok(())
    }
}

impl<W: Write> fmt::Debug for JsonOutput<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonOutput")
            .field("format", &self.format)
            .field("records_written", &self.records_written)
            .finish_non_exhaustive()
    }
}

/// Sink keeping every unit in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    /// Units in arrival order
    pub units: Vec<JsonValue>,
    finished: bool,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, with array units split
    pub fn records(&self) -> Vec<JsonValue> {
        self.units
            .iter()
            .flat_map(|unit| match unit {
                JsonValue::Array(items) => items.clone(),
                single => vec![single.clone()],
            })
            .collect()
    }

    /// Check if `finish` was called
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for CollectingSink {
    fn write(&mut self, unit: &JsonValue) -> Result<()> {
        self.units.push(unit.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
