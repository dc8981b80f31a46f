//! Countdown aggregator: ongoing flag and start/end countdowns per program.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::types::{CountdownRecord, Timeline};

fn seconds_between(now: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - now).num_milliseconds() as f64 / 1000.0
}

fn keep_larger(slot: &mut Option<f64>, seconds: f64) {
    if slot.is_none_or(|current| current < seconds) {
        *slot = Some(seconds);
    }
}

/// Computes a [`CountdownRecord`] for every program in `timeline`.
///
/// Countdowns report the farthest known upcoming start and end among the
/// program's intervals, not the nearest. A program with an interval in
/// progress reports `seconds_until_start = 0`. Fields with no qualifying
/// interval stay `None`.
///
/// # Arguments
///
/// * `timeline` - Merged timeline for one class
/// * `now` - Reference instant, captured once per collection cycle
pub fn countdowns(timeline: &Timeline, now: DateTime<Utc>) -> BTreeMap<String, CountdownRecord> {
    let mut records: BTreeMap<String, CountdownRecord> = BTreeMap::new();

    for interval in timeline {
        let record = records.entry(interval.program.clone()).or_default();

        if interval.is_ongoing(now) {
            record.ongoing = 1;
        } else if interval.start > now {
            keep_larger(&mut record.seconds_until_start, seconds_between(now, interval.start));
        }

        if interval.end > now {
            keep_larger(&mut record.seconds_until_end, seconds_between(now, interval.end));
        }
    }

    for record in records.values_mut() {
        if record.ongoing == 1 {
            record.seconds_until_start = Some(0.0);
        }
    }

    records
}
