//! Output module
//!
//! Writes fetched records as JSON.
//!
//! # Overview
//!
//! Every page unit a stream yields is handed to a [`RecordSink`]. The
//! built-in [`JsonOutput`] writes either one JSON document per line
//! (`jsonlines`, array units are split into their records) or a single
//! JSON array of all records (`json`). Format and destination come from
//! `brook.output.format` and `brook.output.to`.

mod writer;

pub use writer::{CollectingSink, JsonOutput, OutputFormat, RecordSink, STDOUT};
