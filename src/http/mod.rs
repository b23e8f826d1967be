//! HTTP module
//!
//! Requests are plain values ([`HttpRequest`]) built from stream templates,
//! authenticated in place and handed to a [`Transport`]. The default
//! transport is [`HttpClient`], backed by reqwest.

mod client;
mod types;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, Transport};
pub use types::{HttpRequest, HttpResponse};

#[cfg(test)]
mod tests;
