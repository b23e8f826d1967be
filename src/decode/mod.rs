//! Response decoder module
//!
//! Supports: JSON, JSONL
//!
//! A decoder turns a response body into the unit a stream yields for the
//! page: the whole JSON document, the part of it at a records path, or an
//! array of JSON Lines records.

mod decoders;
mod types;

pub use decoders::{decoder_for, extract_path, extract_string, JsonDecoder, JsonlDecoder};
pub use types::{DecoderConfig, DecoderFormat, RecordDecoder};
