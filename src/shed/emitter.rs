//! Timeline emitter: turns a timeline into per-minute 0/1 step samples.
//!
//! For each interval the emitter proposes a leading 0 one minute before the
//! start, a 1 for every minute in `[start, end)`, and a trailing 0 one minute
//! after the end. The trailing 0 is withheld when the next interval of the
//! same program starts at or before this one's end, or when it would not
//! fall strictly before the class's coverage end. Every proposal then passes
//! a per-program monotonic gate, so each program's samples are strictly
//! increasing in time.

use std::collections::HashMap;
use std::iter::FusedIterator;

use chrono::{DateTime, Duration, Utc};
use log::warn;

use super::types::{Interval, Sample, Timeline};

fn one_minute() -> Duration {
    Duration::minutes(1)
}

/// Per-program record of the last emitted timestamp.
#[derive(Debug, Default)]
pub struct MonotonicGate {
    last_emitted: HashMap<String, DateTime<Utc>>,
}

impl MonotonicGate {
    /// Admits `timestamp` for `program` only if it is strictly later than
    /// the program's last admitted timestamp, recording it when admitted.
    pub fn admit(&mut self, program: &str, timestamp: DateTime<Utc>) -> bool {
        match self.last_emitted.get_mut(program) {
            Some(last) if *last >= timestamp => false,
            Some(last) => {
                *last = timestamp;
                true
            }
            None => {
                self.last_emitted.insert(program.to_string(), timestamp);
                true
            }
        }
    }
}

/// Position inside the current interval.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Leading,
    Active(DateTime<Utc>),
    Trailing,
}

/// Lazy, single-pass sample sequence for one class's timeline.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use shed_timeline::shed::emitter::TimelineEmitter;
/// use shed_timeline::shed::normalize::normalize;
/// use shed_timeline::shed::types::Interval;
///
/// let start = Utc.with_ymd_and_hms(2022, 7, 18, 10, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2022, 7, 18, 10, 2, 0).unwrap();
/// let coverage_end = Utc.with_ymd_and_hms(2022, 7, 19, 0, 0, 0).unwrap();
/// let timeline = normalize(vec![Interval::new("Cycled AC", "R", start, end)]);
///
/// let values: Vec<u8> = TimelineEmitter::new(&timeline, coverage_end)
///     .map(|s| s.value)
///     .collect();
/// assert_eq!(values, vec![0, 1, 1, 0]);
/// ```
#[derive(Debug)]
pub struct TimelineEmitter<'a> {
    intervals: &'a [Interval],
    coverage_end: DateTime<Utc>,
    index: usize,
    phase: Phase,
    gate: MonotonicGate,
}

impl<'a> TimelineEmitter<'a> {
    /// Creates an emitter over `timeline`.
    ///
    /// # Arguments
    ///
    /// * `timeline` - Merged, normalized timeline for one class
    /// * `coverage_end` - Last instant for which the class's history is complete
    pub fn new(timeline: &'a Timeline, coverage_end: DateTime<Utc>) -> Self {
        Self {
            intervals: timeline.as_slice(),
            coverage_end,
            index: 0,
            phase: Phase::Leading,
            gate: MonotonicGate::default(),
        }
    }

    /// Timestamp of the trailing 0 for the interval at `index`, if any.
    fn trailing_edge(&self, index: usize) -> Option<DateTime<Utc>> {
        let current = &self.intervals[index];
        if let Some(next) = self.intervals.get(index + 1) {
            if next.program == current.program && next.start <= current.end {
                return None;
            }
        }

        let after = current.end + one_minute();
        (after < self.coverage_end).then_some(after)
    }
}

impl Iterator for TimelineEmitter<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let intervals = self.intervals;
        loop {
            let interval = intervals.get(self.index)?;

            let proposal = match self.phase {
                Phase::Leading => {
                    self.phase = if interval.is_well_formed() {
                        Phase::Active(interval.start)
                    } else {
                        warn!("skipping active run of malformed interval {interval}");
                        Phase::Trailing
                    };
                    Some((interval.start - one_minute(), 0))
                }
                Phase::Active(t) if t < interval.end => {
                    self.phase = Phase::Active(t + one_minute());
                    Some((t, 1))
                }
                Phase::Active(_) => {
                    self.phase = Phase::Trailing;
                    None
                }
                Phase::Trailing => {
                    let edge = self.trailing_edge(self.index);
                    self.index += 1;
                    self.phase = Phase::Leading;
                    edge.map(|t| (t, 0))
                }
            };

            if let Some((timestamp, value)) = proposal {
                if self.gate.admit(&interval.program, timestamp) {
                    return Some(Sample {
                        program: interval.program.clone(),
                        class: interval.class.clone(),
                        timestamp,
                        value,
                    });
                }
            }
        }
    }
}

impl FusedIterator for TimelineEmitter<'_> {}
