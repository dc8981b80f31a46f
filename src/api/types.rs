//! API response and query types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shed::types::CountdownRecord;

/// Query parameters for `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Days of event log before now; missing or < 1 uses the configured default.
    pub days: Option<i64>,
}

/// Countdowns of one class, or the reason they are missing.
#[derive(Debug, Serialize)]
pub struct ClassCountdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programs: Option<BTreeMap<String, CountdownRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /countdown`.
#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    /// Reference instant of the cycle.
    pub now: DateTime<Utc>,
    /// Countdowns keyed by class name.
    pub classes: BTreeMap<String, ClassCountdown>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}
