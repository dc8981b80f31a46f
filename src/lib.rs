//! Load-shed program timeline reconstruction and exposition.
//!
//! Rebuilds a per-minute on/off signal for every load-shedding program from
//! a historical event log and the utility's forecast, and derives
//! countdowns to the next known start and end of each program.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
/// Sample export.
pub mod io;
/// Normalizer, merger, emitter and countdown aggregator.
pub mod shed;
pub mod source;
