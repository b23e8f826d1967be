//! Execution engine module
//!
//! Pulls the pages of one REST stream.
//!
//! # Overview
//!
//! A [`PageFetcher`] walks a fixed sequence of phases:
//!
//! ```text
//! Init -> RequestPrepared -> Sent -> Validated -> Continuing -> Sent -> ...
//!                                         \-> Failed       \-> Done
//! ```
//!
//! Preparing renders the stream's request template from the config
//! registry and applies the selected auth. Each page is then requested,
//! checked (status, body, output schema) and yielded as one unit before the
//! stream's pagination hook is asked for the next request. Pages are only
//! fetched when pulled.

mod types;

pub use types::{FetchOptions, FetchPhase, FetchStats};

use crate::auth::Auth;
use crate::config::{ConfigRegistry, SCHEMA_VALIDATION};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::pagination::count_records;
use crate::schema::validate_instance;
use crate::stream::RestStream;
use crate::template::{render_value, render_with_registry};
use crate::types::JsonValue;
use tracing::debug;

/// Lazy, forward-only page sequence of a REST stream
pub struct PageFetcher<'a> {
    stream: &'a RestStream,
    auth: &'a Auth,
    registry: &'a ConfigRegistry,
    transport: &'a dyn Transport,
    options: FetchOptions,
    phase: FetchPhase,
    prepared: Option<HttpRequest>,
    last: Option<(HttpRequest, HttpResponse)>,
    enforce_schema: bool,
    stats: FetchStats,
}

impl<'a> PageFetcher<'a> {
    /// Create a fetcher; nothing is rendered or sent until pulled
    pub fn new(
        stream: &'a RestStream,
        auth: &'a Auth,
        registry: &'a ConfigRegistry,
        transport: &'a dyn Transport,
        options: FetchOptions,
    ) -> Self {
        Self {
            stream,
            auth,
            registry,
            transport,
            options,
            phase: FetchPhase::Init,
            prepared: None,
            last: None,
            enforce_schema: true,
            stats: FetchStats::default(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Statistics so far
    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Render and authenticate the first request
    ///
    /// Idempotent: later calls return the request prepared by the first.
    pub fn prepare(&mut self) -> Result<&HttpRequest> {
        if self.prepared.is_none() {
            match self.prepare_request() {
                Ok(request) => {
                    debug!(
                        stream = %self.stream.info().name,
                        method = %request.method,
                        url = %request.url,
                        "Request prepared"
                    );
                    self.prepared = Some(request);
                    self.phase = FetchPhase::RequestPrepared;
                }
                Err(e) => {
                    self.phase = FetchPhase::Failed;
                    return Err(e);
                }
            }
        }

        self.prepared
            .as_ref()
            .ok_or_else(|| Error::Other("Request was not prepared".to_string()))
    }

    fn prepare_request(&mut self) -> Result<HttpRequest> {
        let registry = self.registry;
        let template = self.stream.request();

        let mut request = template.clone();
        request.url = render_with_registry(&template.url, registry)?;
        for value in request.headers.values_mut() {
            *value = render_with_registry(value, registry)?;
        }
        for value in request.params.values_mut() {
            *value = render_with_registry(value, registry)?;
        }
        if let Some(body) = &template.body {
            request.body = Some(render_value(body, registry)?);
        }

        self.auth.prepare(&mut request, registry)?;
        self.enforce_schema = registry.resolve_bool(SCHEMA_VALIDATION)?.unwrap_or(true);
        Ok(request)
    }

    /// Pull the next page
    ///
    /// Returns `Ok(None)` once the sequence has ended, whether normally,
    /// by reaching the page limit, or after an error was returned.
    pub async fn next_page(&mut self) -> Result<Option<JsonValue>> {
        if self.phase.is_terminal() {
            return Ok(None);
        }

        match self.advance().await {
            Ok(Some(unit)) => Ok(Some(unit)),
            Ok(None) => {
                debug!(
                    stream = %self.stream.info().name,
                    pages = self.stats.pages_fetched,
                    "No more pages"
                );
                self.phase = FetchPhase::Done;
                Ok(None)
            }
            Err(e) => {
                self.phase = FetchPhase::Failed;
                Err(e)
            }
        }
    }

    async fn advance(&mut self) -> Result<Option<JsonValue>> {
        let stream = self.stream;
        self.prepare()?;

        if self.options.dry_run {
            return Ok(None);
        }
        if let Some(limit) = self.options.limit {
            if self.stats.pages_fetched >= limit {
                debug!(stream = %stream.info().name, limit, "Page limit reached");
                return Ok(None);
            }
        }

        let next = match self.last.take() {
            Some((request, response)) => {
                self.phase = FetchPhase::Continuing;
                stream
                    .next_request(&request, Some(&response))
                    .map_err(|e| match e {
                        e if e.is_decode_error() => {
                            Error::response_content(stream.info().name.as_str(), e.to_string())
                        }
                        e => e,
                    })?
            }
            None => stream.next_request(self.prepare()?, None)?,
        };
        let Some(request) = next else {
            return Ok(None);
        };

        let response = self.send(&request).await?;
        self.phase = FetchPhase::Sent;

        let unit = self.validate(&request, &response)?;
        self.phase = FetchPhase::Validated;
        self.stats.add_page(count_records(&unit, None)?);
        self.last = Some((request, response));

        Ok(Some(unit))
    }

    async fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let name = &self.stream.info().name;
        debug!(
            stream = %name,
            page = self.stats.pages_fetched + 1,
            url = %request.url,
            "Requesting page"
        );
        self.stats.add_request();

        match self.transport.send(request).await {
            Err(Error::BodyRead { url, message }) => Err(Error::response_content(
                name.as_str(),
                format!("failed to read body from '{url}': {message}"),
            )),
            other => other,
        }
    }

    fn validate(&self, request: &HttpRequest, response: &HttpResponse) -> Result<JsonValue> {
        let info = self.stream.info();

        if !response.is_ok() {
            let url = if response.url.is_empty() {
                request
                    .full_url()
                    .map_or_else(|_| request.url.clone(), |url| url.to_string())
            } else {
                response.url.clone()
            };
            return Err(Error::ResponseStatusInvalid {
                stream: info.name.clone(),
                status: response.status,
                reason: response.reason.clone(),
                url,
            });
        }

        let unit = self
            .stream
            .decode(&response.body)
            .map_err(|e| Error::response_content(info.name.as_str(), e.to_string()))?;

        match &info.output_schema {
            Some(schema) => {
                validate_instance(&unit, schema).map_err(|violation| {
                    Error::OutputSchemaInvalid {
                        stream: info.name.clone(),
                        message: violation.to_string(),
                    }
                })?;
            }
            None if self.enforce_schema => {
                return Err(Error::MissingOutputSchema {
                    stream: info.name.clone(),
                });
            }
            None => {}
        }

        Ok(unit)
    }

    /// Turn the fetcher into a `futures` stream of page units
    ///
    /// The stream ends after the first error.
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<JsonValue>> + 'a {
        futures::stream::try_unfold(self, |mut fetcher| async move {
            Ok(fetcher.next_page().await?.map(|unit| (unit, fetcher)))
        })
    }
}

impl std::fmt::Debug for PageFetcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("stream", &self.stream.info().name)
            .field("auth", self.auth)
            .field("options", &self.options)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
