/// CSV export of emitted step samples.
pub mod export;
