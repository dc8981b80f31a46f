//! Forecast merger: folds committed forecast windows into a timeline.

use log::debug;

use super::normalize::normalize;
use super::types::{ScheduleEntry, Timeline};

/// Appends a synthetic interval for every `Scheduled` entry labelled
/// `forecast_label` that carries a full window, then re-normalizes.
///
/// Entries of any other likelihood or label, and scheduled entries missing
/// a timestamp, are dropped without error.
///
/// # Arguments
///
/// * `timeline` - Normalized event-log timeline for `class`
/// * `class` - Class name stamped on the synthetic intervals
/// * `forecast_label` - Class label used by the forecast, e.g. `"Residential"`
/// * `entries` - Every forecast entry, not yet filtered by class
pub fn merge_forecast<'a>(
    timeline: Timeline,
    class: &str,
    forecast_label: &str,
    entries: impl IntoIterator<Item = &'a ScheduleEntry>,
) -> Timeline {
    let mut intervals = timeline.into_inner();
    let logged = intervals.len();

    intervals.extend(
        entries
            .into_iter()
            .filter_map(|entry| entry.scheduled_interval(class, forecast_label)),
    );

    let synthesized = intervals.len() - logged;
    if synthesized > 0 {
        debug!("class {class}: merged {synthesized} scheduled forecast window(s)");
    }

    normalize(intervals)
}
