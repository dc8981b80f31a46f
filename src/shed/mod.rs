/// Countdown aggregation relative to a fixed "now".
pub mod countdown;
/// Per-minute step-sample emission.
pub mod emitter;
/// Forecast merging.
pub mod merge;
pub mod normalize;
pub mod types;
