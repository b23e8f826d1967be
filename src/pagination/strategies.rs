//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{read_page, NextRequest, StopCondition};
use crate::decode::DecoderConfig;
use crate::decode::extract_string;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use tracing::trace;

// ============================================================================
// Single Page
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct SinglePage;

impl NextRequest for SinglePage {
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        Ok(match response {
            None => Some(previous.clone()),
            Some(_) => None,
        })
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination (e.g., traditional web pagination)
///
/// Uses page number parameter to paginate.
/// Common patterns:
/// - `?page=2`
/// - `?page=2&per_page=50`
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub page_param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u64,
    /// Optional page size parameter name
    pub page_size_param: Option<String>,
    /// Page size value
    pub page_size: Option<u64>,
    /// Stop condition
    pub stop: StopCondition,
    /// How pages are decoded
    pub decoder: DecoderConfig,
}

impl PageNumberPaginator {
    fn with_page(&self, previous: &HttpRequest, page: u64) -> HttpRequest {
        let mut next = previous.clone();
        next.set_param(&self.page_param, page.to_string());
        if let (Some(param), Some(size)) = (&self.page_size_param, self.page_size) {
            next.set_param(param, size.to_string());
        }
        next
    }
}

impl NextRequest for PageNumberPaginator {
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        let Some(response) = response else {
            return Ok(Some(self.with_page(previous, self.start_page)));
        };

        let page = previous
            .params
            .get(&self.page_param)
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(self.start_page);

        let (body, count) = read_page(response, &self.decoder)?;

        if self.stop.should_stop(&body, count, Some(page))? {
            trace!(page, "Stop condition reached");
            return Ok(None);
        }

        // A short page is the last one
        if self.page_size.is_some_and(|size| (count as u64) < size) {
            return Ok(None);
        }

        Ok(Some(self.with_page(previous, page + 1)))
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination (e.g., SQL-style pagination)
///
/// Uses offset and limit parameters to paginate.
/// Common patterns:
/// - `?offset=100&limit=50`
/// - `?skip=100&take=50`
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
    /// Number of records per page
    pub limit_value: u64,
    /// Stop condition
    pub stop: StopCondition,
    /// How pages are decoded
    pub decoder: DecoderConfig,
}

impl OffsetPaginator {
    fn with_offset(&self, previous: &HttpRequest, offset: u64) -> HttpRequest {
        let mut next = previous.clone();
        next.set_param(&self.offset_param, offset.to_string());
        next.set_param(&self.limit_param, self.limit_value.to_string());
        next
    }
}

impl NextRequest for OffsetPaginator {
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        let Some(response) = response else {
            return Ok(Some(self.with_offset(previous, 0)));
        };

        let (body, count) = read_page(response, &self.decoder)?;

        if self.stop.should_stop(&body, count, None)? || (count as u64) < self.limit_value {
            return Ok(None);
        }

        let offset = previous
            .params
            .get(&self.offset_param)
            .and_then(|o| o.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(Some(self.with_offset(previous, offset + self.limit_value)))
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (e.g., Stripe, Slack)
///
/// Uses a cursor value from the response to fetch the next page.
/// Common patterns:
/// - `?starting_after=obj_123`
/// - `?cursor=abc123`
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Path to the cursor in the response body
    pub cursor_path: String,
    /// Stop condition
    pub stop: StopCondition,
    /// How pages are decoded
    pub decoder: DecoderConfig,
}

impl NextRequest for CursorPaginator {
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        let Some(response) = response else {
            return Ok(Some(previous.clone()));
        };

        let (body, count) = read_page(response, &self.decoder)?;
        if self.stop.should_stop(&body, count, None)? {
            return Ok(None);
        }

        // No cursor (or an empty one) means last page
        let Some(cursor) = extract_string(&body, &self.cursor_path)? else {
            return Ok(None);
        };

        let mut next = previous.clone();
        next.set_param(&self.cursor_param, cursor);
        Ok(Some(next))
    }
}

// ============================================================================
// Next URL Pagination
// ============================================================================

/// Next URL pagination (URL in response body)
///
/// Extracts next page URL from a field in the response body.
/// Common patterns:
/// - `{ "next": "https://api.example.com/items?page=2" }`
/// - `{ "pagination": { "next_url": "..." } }`
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// Path to the next URL in the response body
    pub path: String,
    /// How pages are decoded
    pub decoder: DecoderConfig,
}

impl NextRequest for NextUrlPaginator {
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        let Some(response) = response else {
            return Ok(Some(previous.clone()));
        };

        let (body, _) = read_page(response, &self.decoder)?;
        match extract_string(&body, &self.path)? {
            Some(url) => follow(previous, &url).map(Some),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Link Header Pagination
// ============================================================================

/// Link header pagination (RFC 8288)
///
/// Extracts next page URL from the Link header.
/// Common in GitHub, GitLab APIs.
/// Format: `Link: <https://api.github.com/...?page=2>; rel="next", ...`
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow
    pub rel: String,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self {
            rel: "next".to_string(),
        }
    }
}

impl NextRequest for LinkHeaderPaginator {
    fn next_request(
        &self,
        previous: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<Option<HttpRequest>> {
        let Some(response) = response else {
            return Ok(Some(previous.clone()));
        };

        match response
            .header("link")
            .and_then(|link| parse_link_header(link, &self.rel))
        {
            Some(url) => follow(previous, url).map(Some),
            None => Ok(None),
        }
    }
}

/// Parse a Link header and extract the URL for the given rel
pub fn parse_link_header<'a>(header: &'a str, target_rel: &str) -> Option<&'a str> {
    // Link header format: <url>; rel="next", <url>; rel="prev"
    for part in header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                rel = Some(stripped.trim_matches('"').trim_matches('\''));
            }
        }

        if let (Some(u), Some(r)) = (url, rel) {
            if r.split_whitespace().any(|r| r == target_rel) {
                return Some(u);
            }
        }
    }

    None
}

/// Request for a URL given by the server, resolved against the previous one
///
/// The URL carries its own query string, so the previous parameters are
/// dropped.
fn follow(previous: &HttpRequest, url: &str) -> Result<HttpRequest> {
    let url = previous.full_url()?.join(url)?;
    let mut next = previous.clone();
    next.url = url.to_string();
    next.params.clear();
    Ok(next)
}
