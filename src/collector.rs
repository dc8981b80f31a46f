//! One collection cycle: fetch, reconstruct, and summarize every class.
//!
//! The forecast and shed counts are fetched once. Each class then runs on
//! its own scoped thread with its own history fetch, so a failing class
//! never blocks or poisons the others.

use std::any::Any;
use std::collections::BTreeMap;
use std::thread;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};

use crate::config::{ClassConfig, ExporterConfig};
use crate::error::FetchError;
use crate::shed::countdown::countdowns;
use crate::shed::emitter::TimelineEmitter;
use crate::shed::merge::merge_forecast;
use crate::shed::normalize::normalize;
use crate::shed::types::{CountdownRecord, Forecast, History, Sample, ScheduleEntry, ShedCounts};
use crate::source::{HistoryRequest, ShedSource};

/// Reconstructed signal and countdowns for one class.
#[derive(Debug, Clone)]
pub struct ClassReport {
    /// Class name.
    pub class: String,
    /// Last instant the class's event log is complete.
    pub coverage_end: DateTime<Utc>,
    /// Step samples in emission order.
    pub samples: Vec<Sample>,
    /// Countdown record per program.
    pub countdowns: BTreeMap<String, CountdownRecord>,
}

/// Result of one class's pipeline.
#[derive(Debug)]
pub struct ClassOutcome {
    pub class: String,
    pub result: Result<ClassReport, FetchError>,
}

/// Everything gathered in one collection cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Reference instant shared by every class.
    pub now: DateTime<Utc>,
    /// Forecast, if it could be fetched.
    pub forecast: Option<Forecast>,
    /// Shed counts, if they could be fetched.
    pub shed_counts: Option<ShedCounts>,
    /// One outcome per configured class, in configuration order.
    pub classes: Vec<ClassOutcome>,
}

impl CycleReport {
    /// Successful class reports, in configuration order.
    pub fn reports(&self) -> impl Iterator<Item = &ClassReport> {
        self.classes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// Runs the engine over one class's event log and the forecast.
///
/// Normalizes the log, merges the scheduled forecast windows for this
/// class, drains the emitter and computes countdowns against `now`.
pub fn build_class_report<'a>(
    class: &ClassConfig,
    history: History,
    entries: impl IntoIterator<Item = &'a ScheduleEntry>,
    now: DateTime<Utc>,
) -> ClassReport {
    let timeline = normalize(history.intervals);
    let timeline = merge_forecast(timeline, &class.name, &class.forecast_label, entries);

    let samples: Vec<Sample> = TimelineEmitter::new(&timeline, history.coverage_end).collect();
    let countdowns = countdowns(&timeline, now);
    debug!(
        "class {}: {} interval(s), {} sample(s), {} program(s)",
        class.name,
        timeline.len(),
        samples.len(),
        countdowns.len()
    );

    ClassReport {
        class: class.name.clone(),
        coverage_end: history.coverage_end,
        samples,
        countdowns,
    }
}

fn aborted(class: &ClassConfig, panic: &(dyn Any + Send)) -> FetchError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!("collection of class {} panicked: {message}", class.name);
    FetchError::Aborted {
        class: class.name.clone(),
        message,
    }
}

/// Drives collection cycles against a source.
pub struct Collector<'a, S: ShedSource + ?Sized> {
    source: &'a S,
    config: &'a ExporterConfig,
}

impl<'a, S: ShedSource + ?Sized> Collector<'a, S> {
    pub fn new(source: &'a S, config: &'a ExporterConfig) -> Self {
        Self { source, config }
    }

    /// Runs a cycle with the configured event log window.
    pub fn collect(&self, now: DateTime<Utc>) -> CycleReport {
        self.collect_with_history_days(now, self.config.collection.days_in_past)
    }

    /// Runs a cycle requesting `days_in_past` days of event log before `now`.
    pub fn collect_with_history_days(&self, now: DateTime<Utc>, days_in_past: u32) -> CycleReport {
        let forecast = self
            .source
            .forecast()
            .inspect_err(|e| warn!("forecast fetch failed: {e}"))
            .ok();
        let shed_counts = self
            .source
            .shed_counts()
            .inspect_err(|e| warn!("shed count fetch failed: {e}"))
            .ok();

        let request = HistoryRequest {
            start: now - Duration::days(i64::from(days_in_past)),
            end: now + Duration::days(i64::from(self.config.collection.days_ahead)),
            now,
        };

        let classes = thread::scope(|scope| {
            let handles: Vec<_> = self
                .config
                .classes
                .iter()
                .map(|class| {
                    let forecast = forecast.as_ref();
                    let handle = scope.spawn(move || self.collect_class(class, &request, forecast));
                    (class, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(class, handle)| ClassOutcome {
                    class: class.name.clone(),
                    result: handle
                        .join()
                        .unwrap_or_else(|panic| Err(aborted(class, panic.as_ref()))),
                })
                .collect::<Vec<_>>()
        });

        let failed = classes.iter().filter(|o| o.result.is_err()).count();
        info!(
            "collected {} class(es) at {}, {failed} failed",
            classes.len(),
            now.to_rfc3339()
        );

        CycleReport {
            now,
            forecast,
            shed_counts,
            classes,
        }
    }

    fn collect_class(
        &self,
        class: &ClassConfig,
        request: &HistoryRequest,
        forecast: Option<&Forecast>,
    ) -> Result<ClassReport, FetchError> {
        let history = self
            .source
            .history(class, request)
            .inspect_err(|e| warn!("history fetch for class {} failed: {e}", class.name))?;

        Ok(build_class_report(
            class,
            history,
            forecast.into_iter().flat_map(Forecast::entries),
            request.now,
        ))
    }
}
