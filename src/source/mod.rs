//! Upstream record sources.
//!
//! A [`ShedSource`] hands back already-parsed event logs, forecasts and shed
//! counts, or fails outright. Each call stands alone: implementations must
//! open their own session per call and never share one between concurrent
//! class fetches.

mod file;
mod memory;

pub use file::{FileSource, local_midnight};
pub use memory::MemorySource;

use chrono::{DateTime, Utc};

use crate::config::ClassConfig;
use crate::error::FetchError;
use crate::shed::types::{Forecast, History, ShedCounts};

/// Event log window for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Earliest day requested.
    pub start: DateTime<Utc>,
    /// Latest day requested.
    pub end: DateTime<Utc>,
    /// Cycle reference instant, used to cap the coverage end at today.
    pub now: DateTime<Utc>,
}

/// Provider of upstream load-shed records.
pub trait ShedSource: Send + Sync {
    /// Fetches the event log of `class` over `request`'s window.
    fn history(&self, class: &ClassConfig, request: &HistoryRequest)
    -> Result<History, FetchError>;

    /// Fetches the current forecast for every class.
    fn forecast(&self) -> Result<Forecast, FetchError>;

    /// Fetches per-program shed counters.
    fn shed_counts(&self) -> Result<ShedCounts, FetchError>;
}
