//! HTTP exposition of collection cycles.
//!
//! Provides three GET endpoints, each running a fresh collection cycle:
//! - `/metrics`: realtime gauges in Prometheus text format
//! - `/history?days=N`: the reconstructed step signal, timestamped
//! - `/countdown`: per-class countdown records as JSON

mod handlers;
mod types;

pub use types::{ClassCountdown, CountdownResponse, ErrorResponse, HistoryQuery};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use log::info;

use crate::config::ExporterConfig;
use crate::source::ShedSource;

/// Application state shared across all request handlers.
///
/// Holds no cycle results: every request fetches and reconstructs afresh.
pub struct AppState {
    /// Exporter configuration.
    pub config: ExporterConfig,
    /// Upstream record source.
    pub source: Arc<dyn ShedSource>,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .route("/history", get(handlers::get_history))
        .route("/countdown", get(handlers::get_countdown))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await
}
