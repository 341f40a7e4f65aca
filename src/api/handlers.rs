//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, TelemetryQuery, TelemetryRecord};

/// Returns the run report.
///
/// `GET /report` → 200 + `Report` JSON, or 404 + `ErrorResponse` when the
/// run executed no steps
pub async fn get_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.report {
        Some(report) => Ok(Json(report.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no report: the run executed no steps".to_string(),
            }),
        )),
    }
}

/// Returns telemetry records, optionally filtered by time index range.
///
/// `GET /telemetry` → 200 + `Vec<TelemetryRecord>` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<TelemetryRecord> = state
        .records
        .iter()
        .filter(|r| (from..=to).contains(&r.time_index))
        .map(TelemetryRecord::from)
        .collect();

    Ok(Json(records))
}
