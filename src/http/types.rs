//! Transport-neutral request and response types
//!
//! Streams, auth methods and pagination strategies work on these plain
//! values; only the [`Transport`](super::Transport) touches the wire.

use crate::error::Result;
use crate::types::{JsonValue, Method, StringMap};
use bytes::Bytes;
use std::borrow::Cow;
use url::Url;

/// A request to be sent by a transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL, possibly already carrying a query string
    pub url: String,
    /// Request headers
    pub headers: StringMap,
    /// Query parameters appended to the URL
    pub params: StringMap,
    /// JSON body
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    /// Create a request
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header in place
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Set a query parameter in place
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Header value, matched case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query parameters applied
    pub fn full_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        Ok(url)
    }
}

/// A response returned by a transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Reason phrase
    pub reason: String,
    /// Final URL of the request
    pub url: String,
    /// Response headers, names lowercased
    pub headers: StringMap,
    /// Raw body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response with the given status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Default::default()
        }
    }

    /// Create a 200 response with a JSON body
    pub fn json_ok(body: &JsonValue) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: Bytes::from(body.to_string()),
            ..Default::default()
        }
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add a header (name is lowercased)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Header value, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check for the one status pages are accepted with
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Decode the body as JSON
    pub fn json(&self) -> serde_json::Result<JsonValue> {
        serde_json::from_slice(&self.body)
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
