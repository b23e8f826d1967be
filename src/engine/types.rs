//! Engine types
//!
//! Options and statistics of a single stream fetch.

use std::fmt;

/// Options for fetching a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of pages to fetch (unlimited if `None`)
    pub limit: Option<u64>,
    /// Only prepare the first request, send nothing
    pub dry_run: bool,
}

impl FetchOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page limit
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Enable or disable dry run
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Where a [`PageFetcher`](super::PageFetcher) is in its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// Nothing done yet
    Init,
    /// Template rendered and authenticated
    RequestPrepared,
    /// Request submitted, response not yet checked
    Sent,
    /// Page accepted and yielded
    Validated,
    /// Asking the pagination hook for the next request
    Continuing,
    /// Sequence ended normally
    Done,
    /// Sequence ended with an error
    Failed,
}

impl FetchPhase {
    /// Check if no more pages will be yielded
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchPhase::Done | FetchPhase::Failed)
    }
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchPhase::Init => "init",
            FetchPhase::RequestPrepared => "request_prepared",
            FetchPhase::Sent => "sent",
            FetchPhase::Validated => "validated",
            FetchPhase::Continuing => "continuing",
            FetchPhase::Done => "done",
            FetchPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Statistics from a fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Requests submitted
    pub requests_sent: u64,
    /// Pages yielded
    pub pages_fetched: u64,
    /// Records yielded (array units count their elements)
    pub records_fetched: u64,
}

impl FetchStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a submitted request
    pub fn add_request(&mut self) {
        self.requests_sent += 1;
    }

    /// Count a yielded page
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_fetched += records as u64;
    }

    /// Merge the stats of another fetch
    pub fn merge(&mut self, other: &FetchStats) {
        self.requests_sent += other.requests_sent;
        self.pages_fetched += other.pages_fetched;
        self.records_fetched += other.records_fetched;
    }
}
