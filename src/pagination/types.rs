//! Pagination types and traits
//!
//! A [`NextRequest`] hook decides, from the previous request and its
//! response, what to send next. Hooks are stateless: everything they need
//! to continue is carried by the request/response pair.

use super::strategies::{
    CursorPaginator, LinkHeaderPaginator, NextUrlPaginator, OffsetPaginator, PageNumberPaginator,
    SinglePage,
};
use crate::decode::{
    extract_path, extract_string, DecoderConfig, DecoderFormat, JsonlDecoder, RecordDecoder,
};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Produces the next request of a stream
pub trait NextRequest: Send + Sync {
    /// Compute the request to send after `previous`
    ///
    /// Called first with the prepared request and no response; the result
    /// is the first request sent. Returning `None` ends the stream.
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>>;
}

impl<F> NextRequest for F
where
    F: Fn(&HttpRequest, Option<&HttpResponse>) -> Result<Option<HttpRequest>> + Send + Sync,
{
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        self(previous, response)
    }
}

/// Pagination settings of a stream definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// One request, no pagination
    #[default]
    SinglePage,

    /// Page number pagination (`?page=2`)
    PageNumber {
        /// Query parameter name for page number
        #[serde(default = "default_page_param", alias = "param")]
        page_param: String,
        /// First page number (usually 0 or 1)
        #[serde(default = "default_start_page", alias = "start")]
        start_page: u64,
        /// Optional page size parameter name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page_size_param: Option<String>,
        /// Page size value; a shorter page ends the stream
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page_size: Option<u64>,
        /// Stop condition
        #[serde(default)]
        stop: StopCondition,
    },

    /// Offset pagination (`?offset=100&limit=50`)
    Offset {
        /// Query parameter name for offset
        #[serde(default = "default_offset_param")]
        offset_param: String,
        /// Query parameter name for limit
        #[serde(default = "default_limit_param")]
        limit_param: String,
        /// Number of records per page
        limit_value: u64,
        /// Stop condition
        #[serde(default)]
        stop: StopCondition,
    },

    /// Cursor taken from the response body (`?cursor=abc`)
    Cursor {
        /// Query parameter name for cursor
        #[serde(alias = "param")]
        cursor_param: String,
        /// Path to the cursor in the response body
        #[serde(alias = "path")]
        cursor_path: String,
        /// Stop condition
        #[serde(default = "StopCondition::never")]
        stop: StopCondition,
    },

    /// Next page URL in the response body
    NextUrl {
        /// Path to the URL in the response body
        path: String,
    },

    /// Next page URL in the `Link` header (RFC 8288)
    LinkHeader {
        /// Rel value to follow
        #[serde(default = "default_rel")]
        rel: String,
    },
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_start_page() -> u64 {
    1
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_rel() -> String {
    "next".to_string()
}

impl PaginationConfig {
    /// Create page number pagination config
    pub fn page_number(page_param: impl Into<String>, start_page: u64) -> Self {
        Self::PageNumber {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            page_size: None,
            stop: StopCondition::EmptyPage,
        }
    }

    /// Create cursor pagination config
    pub fn cursor(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self::Cursor {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
            stop: StopCondition::Never,
        }
    }

    /// Create next URL pagination config
    pub fn next_url(path: impl Into<String>) -> Self {
        Self::NextUrl { path: path.into() }
    }

    /// Create link header pagination config
    pub fn link_header() -> Self {
        Self::LinkHeader { rel: default_rel() }
    }

    /// Build the hook for this config
    ///
    /// Pages are read with the stream's `decoder` settings: its format, and
    /// its records path when counting records for stop conditions.
    pub fn build(&self, decoder: &DecoderConfig) -> Box<dyn NextRequest> {
        let decoder = decoder.clone();
        match self.clone() {
            PaginationConfig::SinglePage => Box::new(SinglePage),
            PaginationConfig::PageNumber {
                page_param,
                start_page,
                page_size_param,
                page_size,
                stop,
            } => Box::new(PageNumberPaginator {
                page_param,
                start_page,
                page_size_param,
                page_size,
                stop,
                decoder,
            }),
            PaginationConfig::Offset {
                offset_param,
                limit_param,
                limit_value,
                stop,
            } => Box::new(OffsetPaginator {
                offset_param,
                limit_param,
                limit_value,
                stop,
                decoder,
            }),
            PaginationConfig::Cursor {
                cursor_param,
                cursor_path,
                stop,
            } => Box::new(CursorPaginator {
                cursor_param,
                cursor_path,
                stop,
                decoder,
            }),
            PaginationConfig::NextUrl { path } => Box::new(NextUrlPaginator { path, decoder }),
            PaginationConfig::LinkHeader { rel } => Box::new(LinkHeaderPaginator { rel }),
        }
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopCondition {
    /// Never stop on content; the strategy decides
    Never,

    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop when a field has a specific value
    Field {
        /// Path to the field
        path: String,
        /// Value that ends pagination
        value: JsonValue,
    },

    /// Stop when the current page number reaches total pages
    TotalPages {
        /// Path to total pages field
        path: String,
    },
}

impl StopCondition {
    fn never() -> Self {
        StopCondition::Never
    }

    /// Create a field-based stop condition
    pub fn field(path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::Field {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a total pages stop condition
    pub fn total_pages(path: impl Into<String>) -> Self {
        Self::TotalPages { path: path.into() }
    }

    /// Check the condition against a decoded page
    ///
    /// `page` is the number of the page just received, if the strategy
    /// numbers pages.
    pub fn should_stop(
        &self,
        body: &JsonValue,
        records_count: usize,
        page: Option<u64>,
    ) -> Result<bool> {
        Ok(match self {
            StopCondition::Never => false,
            StopCondition::EmptyPage => records_count == 0,
            StopCondition::Field { path, value } => {
                extract_path(body, path)?.as_ref() == Some(value)
            }
            StopCondition::TotalPages { path } => {
                let total = extract_string(body, path)?.and_then(|s| s.parse::<u64>().ok());
                matches!((page, total), (Some(page), Some(total)) if page >= total)
            }
        })
    }
}

/// Count the records of a decoded page
///
/// Arrays count their elements, null counts as empty, anything else as a
/// single record.
pub fn count_records(body: &JsonValue, records_path: Option<&str>) -> Result<usize> {
    let records = match records_path {
        Some(path) => extract_path(body, path)?,
        None => Some(body.clone()),
    };

    Ok(match records {
        None | Some(JsonValue::Null) => 0,
        Some(JsonValue::Array(items)) => items.len(),
        Some(_) => 1,
    })
}

/// Decode a page for a strategy to inspect, with its record count
///
/// JSON bodies come back whole, counted at the records path. JSON-lines
/// bodies come back as the array of their lines.
pub fn read_page(response: &HttpResponse, decoder: &DecoderConfig) -> Result<(JsonValue, usize)> {
    match decoder.format {
        DecoderFormat::Json => {
            let body: JsonValue = serde_json::from_slice(response.body.as_ref())
                .map_err(|e| Error::decode(format!("invalid JSON body: {e}")))?;
            let count = count_records(&body, decoder.records_path.as_deref())?;
            Ok((body, count))
        }
        DecoderFormat::Jsonl => {
            let body = JsonlDecoder.decode(response.body.as_ref())?;
            let count = count_records(&body, None)?;
            Ok((body, count))
        }
    }
}
