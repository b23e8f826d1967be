//! Stream module
//!
//! A stream is one named collection of records a source can fetch. Base
//! streams carry metadata only; REST streams add the request template,
//! the pagination hook and the decoder used by the
//! [`PageFetcher`](crate::engine::PageFetcher).

mod types;

pub use types::{RequestDescription, RestStream, Stream, StreamDescription, StreamInfo};
