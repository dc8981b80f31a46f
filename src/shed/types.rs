//! Core engine types: intervals, forecasts, samples and countdown records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where an interval came from.
///
/// Synthetic forecast intervals never compare equal to logged ones, so
/// duplicate suppression cannot collapse a forecast window into history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Reported by the backward-looking event log.
    History,
    /// Synthesized from a `Scheduled` forecast entry.
    Forecast,
}

/// A single load-shed window for one program.
///
/// `start < end` is expected but not enforced; see [`Interval::is_well_formed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    /// Program name, e.g. `"Cycled Air Conditioning"`.
    pub program: String,
    /// Program class this interval belongs to, e.g. `"R"`.
    pub class: String,
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
    /// Source of this interval.
    pub origin: Origin,
}

impl Interval {
    /// Creates an interval reported by the event log.
    pub fn new(
        program: impl Into<String>,
        class: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            program: program.into(),
            class: class.into(),
            start,
            end,
            origin: Origin::History,
        }
    }

    /// Creates an interval synthesized from a forecast entry.
    pub fn synthesized(
        program: impl Into<String>,
        class: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            origin: Origin::Forecast,
            ..Self::new(program, class, start, end)
        }
    }

    /// Returns `true` when the window has positive length.
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Returns `true` when `now` lies strictly inside the window.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start < now && now < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} [{} .. {})",
            self.class,
            self.program,
            self.start.to_rfc3339(),
            self.end.to_rfc3339()
        )
    }
}

/// Ordered, deduplicated intervals for one class.
///
/// Only [`normalize`](super::normalize::normalize) builds a `Timeline`, so
/// every instance is sorted by `(program, start)` with adjacent duplicates
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline(Vec<Interval>);

impl Timeline {
    pub(crate) fn from_normalized(intervals: Vec<Interval>) -> Self {
        Self(intervals)
    }

    /// Borrows the intervals in timeline order.
    pub fn as_slice(&self) -> &[Interval] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the timeline, returning its intervals.
    pub fn into_inner(self) -> Vec<Interval> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Forecast probability class for a program.
///
/// Labels that do not match a known class deserialize as `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Likelihood {
    Unlikely,
    Possible,
    Likely,
    Scheduled,
    #[serde(other)]
    Unrecognized,
}

impl Likelihood {
    /// Gauge value: 1 = Unlikely, 2 = Possible, 3 = Likely, 4 = Scheduled.
    pub fn gauge_value(self) -> Option<u8> {
        match self {
            Self::Unlikely => Some(1),
            Self::Possible => Some(2),
            Self::Likely => Some(3),
            Self::Scheduled => Some(4),
            Self::Unrecognized => None,
        }
    }
}

/// One row of the forward-looking forecast.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Forecast class label, e.g. `"Residential"`.
    pub class: String,
    pub program: String,
    pub likelihood: Likelihood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_end: Option<DateTime<Utc>>,
}

impl ScheduleEntry {
    /// Converts a committed forecast into a synthetic interval for `class`.
    ///
    /// Returns `None` unless the entry is `Scheduled`, carries
    /// `forecast_label` as its class and has both timestamps.
    pub fn scheduled_interval(&self, class: &str, forecast_label: &str) -> Option<Interval> {
        if self.likelihood != Likelihood::Scheduled || self.class != forecast_label {
            return None;
        }
        let start = self.expected_start?;
        let end = self.expected_end?;
        Some(Interval::synthesized(&*self.program, class, start, end))
    }
}

/// Transmission system load indicator published with the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ConservationStatus {
    Normal,
    Elevated,
    Peak,
    Critical,
}

impl ConservationStatus {
    /// Gauge value: 1 = Normal, 2 = Elevated, 3 = Peak, 4 = Critical.
    pub fn gauge_value(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Elevated => 2,
            Self::Peak => 3,
            Self::Critical => 4,
        }
    }
}

/// Forward-looking forecast for all classes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub conservation_gauge: ConservationStatus,
    #[serde(default)]
    pub today: Vec<ScheduleEntry>,
    #[serde(default)]
    pub next_day: Vec<ScheduleEntry>,
    pub last_updated: DateTime<Utc>,
}

impl Forecast {
    /// All entries, today first.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.today.iter().chain(self.next_day.iter())
    }
}

/// Event log for one class over a requested window.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// First instant covered by the request.
    pub start_on: DateTime<Utc>,
    /// Last instant for which the log is known to be complete.
    pub coverage_end: DateTime<Utc>,
    /// Raw intervals, unordered and possibly duplicated.
    pub intervals: Vec<Interval>,
}

/// Per-program shed counters since the last reset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShedCounts {
    pub table: BTreeMap<String, u64>,
    pub last_reset_on: NaiveDate,
}

/// One point of a program's reconstructed step function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub program: String,
    pub class: String,
    pub timestamp: DateTime<Utc>,
    /// 1 while the program is shedding, 0 otherwise.
    pub value: u8,
}

/// Derived countdown scalars for one program, relative to a fixed "now".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountdownRecord {
    /// 1 if an interval is in progress.
    pub ongoing: u8,
    /// Seconds until the farthest known upcoming start; 0 while ongoing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_until_start: Option<f64>,
    /// Seconds until the farthest known end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_until_end: Option<f64>,
}
