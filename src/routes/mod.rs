use std::sync::Arc;

use axum::Router;

use crate::TelemetryAggregator;

mod health;
mod ledger;
mod telemetry;

// ---

/// Shared state handed to every route: the one aggregator of the process.
pub type AppState = Arc<TelemetryAggregator>;

pub fn router(aggregator: AppState) -> Router {
    // ---
    Router::new()
        .merge(telemetry::router())
        .merge(ledger::router())
        .merge(health::router())
        .with_state(aggregator)
}
