// src/routes/ledger.rs
//! Ledger endpoint: reconciled alarm, door and transaction sequences.
//!
//! Follows the Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: the handler and its view types
//! - Exports to the gateway (`mod.rs`): a subrouter with `/ledger`

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;
use crate::timestamp;
use crate::{LedgerEvent, Transaction, TransactionKind};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/ledger", get(handler))
}

#[derive(Debug, Serialize)]
struct EventView {
    timestamp: String,
    display: String,
    event: String,
}

impl From<LedgerEvent> for EventView {
    fn from(event: LedgerEvent) -> Self {
        Self {
            display: timestamp::format(&event.timestamp),
            timestamp: event.timestamp,
            event: event.event,
        }
    }
}

#[derive(Debug, Serialize)]
struct TransactionView {
    date: String,
    display: String,
    amount: f64,
    running_balance: f64,
    kind: TransactionKind,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            display: timestamp::format(&tx.date),
            date: tx.date,
            amount: tx.amount,
            running_balance: tx.running_balance,
            kind: tx.kind,
        }
    }
}

#[derive(Debug, Serialize)]
struct LedgerResponse {
    quantity: Option<f64>,
    loading: bool,
    alarms: Vec<EventView>,
    doors: Vec<EventView>,
    transactions: Vec<TransactionView>,
}

/// Handle `GET /ledger`: the three reconciled sequences, newest first.
async fn handler(State(aggregator): State<AppState>) -> Json<LedgerResponse> {
    // ---
    let ledger = aggregator.ledger();

    Json(LedgerResponse {
        quantity: ledger.quantity,
        loading: ledger.loading,
        alarms: ledger.alarms.into_iter().map(EventView::from).collect(),
        doors: ledger.doors.into_iter().map(EventView::from).collect(),
        transactions: ledger
            .transactions
            .into_iter()
            .map(TransactionView::from)
            .collect(),
    })
}
