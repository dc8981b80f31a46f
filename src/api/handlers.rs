//! Request handlers for the API endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use log::error;

use super::AppState;
use super::types::{ClassCountdown, CountdownResponse, ErrorResponse, HistoryQuery};
use crate::collector::{Collector, CycleReport};
use crate::exposition::{self, CONTENT_TYPE};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Longest event log window `/history` will request.
const MAX_HISTORY_DAYS: i64 = 3650;

/// Runs one collection cycle off the async runtime.
async fn run_cycle(state: Arc<AppState>, days_in_past: u32) -> Result<CycleReport, ApiError> {
    tokio::task::spawn_blocking(move || {
        Collector::new(state.source.as_ref(), &state.config)
            .collect_with_history_days(Utc::now(), days_in_past)
    })
    .await
    .map_err(|e| {
        error!("collection cycle aborted: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("collection cycle aborted: {e}"),
            }),
        )
    })
}

fn exposition_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

/// Returns realtime gauges for the present instant.
///
/// `GET /metrics` → 200 + text exposition
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let days = state.config.collection.days_in_past;
    let report = run_cycle(state, days).await?;
    Ok(exposition_response(exposition::render_realtime(&report)))
}

/// Returns the reconstructed step signal.
///
/// `GET /history` → configured window
/// `GET /history?days=N` → N days of event log; N outside 1..=3650 uses the configured window
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let days = query
        .days
        .filter(|d| (1..=MAX_HISTORY_DAYS).contains(d))
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or(state.config.collection.days_in_past);
    let report = run_cycle(state, days).await?;
    Ok(exposition_response(exposition::render_history(&report)))
}

/// Returns per-class countdown records as JSON.
///
/// `GET /countdown` → 200 + `CountdownResponse` JSON
pub async fn get_countdown(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountdownResponse>, ApiError> {
    let days = state.config.collection.days_in_past;
    let report = run_cycle(state, days).await?;

    let classes: BTreeMap<String, ClassCountdown> = report
        .classes
        .into_iter()
        .map(|outcome| {
            let entry = match outcome.result {
                Ok(class) => ClassCountdown {
                    programs: Some(class.countdowns),
                    error: None,
                },
                Err(e) => ClassCountdown {
                    programs: None,
                    error: Some(e.to_string()),
                },
            };
            (outcome.class, entry)
        })
        .collect();

    Ok(Json(CountdownResponse {
        now: report.now,
        classes,
    }))
}
