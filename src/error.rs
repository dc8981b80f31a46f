//! Error types for upstream fetches.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain or parse upstream records.
///
/// Fetch failures are never retried and never fatal: the collector logs
/// them and degrades the affected class or gauge only.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Underlying file or transport could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Event log table could not be decoded.
    #[error("malformed event log {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Forecast or shed count document could not be decoded.
    #[error("malformed document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A single record had an unusable field.
    #[error("{path}, line {line}: {message}")]
    Record {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The upstream had nothing to hand back.
    #[error("{what} unavailable: {reason}")]
    Unavailable { what: String, reason: String },

    /// A class's collection panicked before it could report.
    #[error("collection of class {class} aborted: {message}")]
    Aborted { class: String, message: String },
}
