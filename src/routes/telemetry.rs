// src/routes/telemetry.rs
//! Telemetry endpoints: the current tuple and the rolling window.
//!
//! Follows the Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: handlers and response types
//! - Exports to the gateway (`mod.rs`): a subrouter with `/telemetry` and
//!   `/telemetry/history`

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use super::AppState;
use crate::{SensorReading, TelemetryState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/telemetry", get(current))
        .route("/telemetry/history", get(history).delete(clear_history))
}

/// Current telemetry tuple together with the independent motion stream.
#[derive(Debug, Serialize)]
struct TelemetryResponse {
    #[serde(flatten)]
    state: TelemetryState,
    motion: bool,
    alert: bool,
}

/// Handle `GET /telemetry`.
async fn current(State(aggregator): State<AppState>) -> Json<TelemetryResponse> {
    // ---
    Json(TelemetryResponse {
        state: aggregator.telemetry(),
        motion: aggregator.motion(),
        alert: aggregator.alert_raised(),
    })
}

/// Handle `GET /telemetry/history`: rolling window contents, oldest first.
async fn history(State(aggregator): State<AppState>) -> Json<Vec<SensorReading>> {
    Json(aggregator.window_snapshot())
}

/// Handle `DELETE /telemetry/history`.
async fn clear_history(State(aggregator): State<AppState>) -> StatusCode {
    // ---
    info!("DELETE /telemetry/history");
    aggregator.clear_window();
    StatusCode::NO_CONTENT
}
