//! Source module
//!
//! A [`Source`] ties streams, auth methods and a config registry together
//! and drives fetches into a [`RecordSink`].
//!
//! # Overview
//!
//! - [`Source::fetch_stream`] fetches one stream by name
//! - [`Source::fetch_all`] walks the catalog input, scoping each entry's
//!   configs (and matching state entry) to its fetch
//! - [`Source::describe_streams`] / [`Source::describe_configs`] back the
//!   `list` commands

use crate::auth::{enforce_method_declaration, select_auth, Auth};
use crate::config::{ConfigDeclaration, ConfigDescription, ConfigRegistry};
use crate::engine::{FetchOptions, FetchStats, PageFetcher};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Transport};
use crate::input::InputKind;
use crate::output::RecordSink;
use crate::stream::{Stream, StreamDescription};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for [`Source`]
pub struct SourceBuilder {
    name: String,
    streams: Vec<Stream>,
    auths: Vec<Auth>,
    configs: Vec<ConfigDeclaration>,
    registry: Option<Arc<ConfigRegistry>>,
    transport: Option<Arc<dyn Transport>>,
}

impl SourceBuilder {
    /// Add a stream
    #[must_use]
    pub fn stream(mut self, stream: impl Into<Stream>) -> Self {
        self.streams.push(stream.into());
        self
    }

    /// Add an auth method; earlier methods are preferred
    #[must_use]
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auths.push(auth);
        self
    }

    /// Declare a source-wide config key
    #[must_use]
    pub fn config(mut self, declaration: ConfigDeclaration) -> Self {
        self.configs.push(declaration);
        self
    }

    /// Use an existing registry instead of a fresh one
    #[must_use]
    pub fn registry(mut self, registry: Arc<ConfigRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom transport instead of the reqwest client
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the source, registering every declared config key
    pub fn build(self) -> Result<Source> {
        let mut seen = HashSet::new();
        for stream in &self.streams {
            if !seen.insert(stream.name()) {
                return Err(Error::config(format!(
                    "Stream '{}' is defined more than once in source '{}'",
                    stream.name(),
                    self.name
                )));
            }
        }

        let auths = if self.auths.is_empty() {
            vec![Auth::NoAuth]
        } else {
            self.auths
        };

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ConfigRegistry::new()));
        registry.ensure_registered(enforce_method_declaration())?;
        for auth in &auths {
            for declaration in auth.declarations() {
                registry.ensure_registered(declaration)?;
            }
        }
        for declaration in self.configs {
            registry.register(declaration)?;
        }
        for stream in &self.streams {
            for declaration in stream.configs() {
                registry.ensure_registered(declaration.clone())?;
            }
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::new()?),
        };

        debug!(
            source = %self.name,
            streams = self.streams.len(),
            auths = auths.len(),
            "Source built"
        );

        Ok(Source {
            name: self.name,
            streams: self.streams,
            auths,
            registry,
            transport,
        })
    }
}

/// A data source: named streams sharing auth and configuration
pub struct Source {
    name: String,
    streams: Vec<Stream>,
    auths: Vec<Auth>,
    registry: Arc<ConfigRegistry>,
    transport: Arc<dyn Transport>,
}

impl Source {
    /// Start building a source
    pub fn builder(name: impl Into<String>) -> SourceBuilder {
        SourceBuilder {
            name: name.into(),
            streams: Vec::new(),
            auths: Vec::new(),
            configs: Vec::new(),
            registry: None,
            transport: None,
        }
    }

    /// Source name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Streams in declaration order
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Auth methods in preference order
    pub fn auths(&self) -> &[Auth] {
        &self.auths
    }

    /// Shared config registry
    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    /// Look up a stream by name
    pub fn stream(&self, name: &str) -> Result<&Stream> {
        self.streams
            .iter()
            .find(|stream| stream.name() == name)
            .ok_or_else(|| Error::StreamNotSupported {
                stream: name.to_string(),
                supported: self.streams.iter().map(|s| s.name().to_string()).collect(),
            })
    }

    /// Auth method used for the next fetch
    pub fn auth(&self) -> Result<&Auth> {
        select_auth(&self.auths, &self.registry)
    }

    /// Fetch one stream, writing each page to `sink` as it arrives
    ///
    /// In a dry run only the first request is prepared; nothing is sent
    /// or written.
    pub async fn fetch_stream(
        &self,
        name: &str,
        options: FetchOptions,
        sink: &mut dyn RecordSink,
    ) -> Result<FetchStats> {
        let stream = self.stream(name)?;
        let auth = self.auth()?;
        let Stream::Rest(rest) = stream else {
            return Err(Error::FetchNotImplemented {
                stream: name.to_string(),
            });
        };

        info!(stream = name, auth = %auth, "Fetching stream");
        let mut fetcher =
            PageFetcher::new(rest, auth, &self.registry, self.transport.as_ref(), options);

        if options.dry_run {
            let request = fetcher.prepare()?;
            info!(
                stream = name,
                method = %request.method,
                url = %rest.request().url,
                "Dry run, request prepared but not sent"
            );
            return Ok(*fetcher.stats());
        }

        while let Some(unit) = fetcher.next_page().await? {
            sink.write(&unit)?;
        }

        let stats = *fetcher.stats();
        info!(
            stream = name,
            pages = stats.pages_fetched,
            records = stats.records_fetched,
            "Stream fetched"
        );
        Ok(stats)
    }

    /// Fetch every stream listed in the catalog input, in file order
    ///
    /// Each entry's configs are the catalog overlay for its fetch, and the
    /// state entry of the same name (if any) the state overlay. The first
    /// error aborts the run.
    pub async fn fetch_all(
        &self,
        options: FetchOptions,
        sink: &mut dyn RecordSink,
    ) -> Result<FetchStats> {
        let entries = self.registry.catalog_entries()?;
        info!(source = %self.name, streams = entries.len(), "Fetching catalog");

        let mut total = FetchStats::new();
        for entry in entries {
            let _catalog = self
                .registry
                .install_overlay(InputKind::Catalog, entry.configs.unwrap_or_default())?;
            let _state = match self.registry.state_entry(&entry.name) {
                Some(state) => Some(
                    self.registry
                        .install_overlay(InputKind::State, state.configs.unwrap_or_default())?,
                ),
                None => None,
            };

            let stats = self.fetch_stream(&entry.name, options, sink).await?;
            total.merge(&stats);
        }

        Ok(total)
    }

    /// Listing of every stream
    pub fn describe_streams(&self) -> Vec<StreamDescription> {
        self.streams.iter().map(Stream::describe).collect()
    }

    /// Listing of every registered config key, secrets redacted
    ///
    /// Fails when a provided value has the wrong type.
    pub fn describe_configs(&self) -> Result<Vec<ConfigDescription>> {
        self.registry.describe_all()
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("streams", &self.streams)
            .field("auths", &self.auths)
            .finish_non_exhaustive()
    }
}
