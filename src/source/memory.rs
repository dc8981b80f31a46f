//! In-memory source for embedding callers that already hold parsed records.

use std::collections::HashMap;

use super::{HistoryRequest, ShedSource};
use crate::config::ClassConfig;
use crate::error::FetchError;
use crate::shed::types::{Forecast, History, ShedCounts};

#[derive(Debug, Clone)]
enum HistorySlot {
    Ready(History),
    Failing(String),
}

/// Serves pre-built records keyed by class name.
///
/// A class with no registered history yields an empty log whose coverage
/// ends at the earlier of the request end and `now`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    histories: HashMap<String, HistorySlot>,
    forecast: Option<Forecast>,
    shed_counts: Option<ShedCounts>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the event log returned for `class`.
    pub fn with_history(mut self, class: &str, history: History) -> Self {
        self.histories
            .insert(class.to_string(), HistorySlot::Ready(history));
        self
    }

    /// Makes every history fetch for `class` fail with `reason`.
    pub fn with_failing_history(mut self, class: &str, reason: &str) -> Self {
        self.histories
            .insert(class.to_string(), HistorySlot::Failing(reason.to_string()));
        self
    }

    pub fn with_forecast(mut self, forecast: Forecast) -> Self {
        self.forecast = Some(forecast);
        self
    }

    pub fn with_shed_counts(mut self, shed_counts: ShedCounts) -> Self {
        self.shed_counts = Some(shed_counts);
        self
    }
}

impl ShedSource for MemorySource {
    fn history(
        &self,
        class: &ClassConfig,
        request: &HistoryRequest,
    ) -> Result<History, FetchError> {
        match self.histories.get(&class.name) {
            Some(HistorySlot::Ready(history)) => Ok(history.clone()),
            Some(HistorySlot::Failing(reason)) => Err(FetchError::Unavailable {
                what: format!("history for class {}", class.name),
                reason: reason.clone(),
            }),
            None => Ok(History {
                start_on: request.start,
                coverage_end: request.end.min(request.now),
                intervals: Vec::new(),
            }),
        }
    }

    fn forecast(&self) -> Result<Forecast, FetchError> {
        self.forecast.clone().ok_or_else(|| FetchError::Unavailable {
            what: "forecast".to_string(),
            reason: "none published".to_string(),
        })
    }

    fn shed_counts(&self) -> Result<ShedCounts, FetchError> {
        self.shed_counts
            .clone()
            .ok_or_else(|| FetchError::Unavailable {
                what: "shed counts".to_string(),
                reason: "none published".to_string(),
            })
    }
}
