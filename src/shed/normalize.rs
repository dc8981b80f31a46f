//! Event normalizer: ordering and duplicate suppression.

use super::types::{Interval, Timeline};

/// Sorts intervals by `(program, start)` and drops adjacent exact duplicates.
///
/// The sort is stable, so intervals sharing a program and start keep their
/// input order. Equal intervals that are not adjacent after sorting survive.
pub fn normalize(mut intervals: Vec<Interval>) -> Timeline {
    intervals.sort_by(|a, b| a.program.cmp(&b.program).then(a.start.cmp(&b.start)));
    intervals.dedup();
    Timeline::from_normalized(intervals)
}
