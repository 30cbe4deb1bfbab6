//! Simple data models for the telemetry engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---

/// One temperature/humidity sample as accepted into the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub captured_at: DateTime<Utc>,
}

impl SensorReading {
    // ---
    pub fn new(temperature: f64, humidity: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            temperature,
            humidity,
            captured_at,
        }
    }
}

/// Direction of a stock movement in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    // ---
    #[default]
    Inbound,
    Outbound,
}

impl TransactionKind {
    /// Map a ledger `type` label onto a direction.
    ///
    /// The store writes `NHAP` for goods received and `XUAT` for goods
    /// shipped; English labels are accepted as well. Anything unrecognised
    /// falls back to [`TransactionKind::Inbound`].
    pub fn from_label(label: &str) -> Self {
        // ---
        match label.trim().to_ascii_uppercase().as_str() {
            "XUAT" | "OUT" | "OUTBOUND" => TransactionKind::Outbound,
            _ => TransactionKind::Inbound,
        }
    }
}

/// A stock movement reconciled from a top-level ledger key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    // ---
    /// Raw ledger key, `YYYY-MM-DD_HH-mm-ss` when well formed.
    pub date: String,
    pub amount: f64,
    pub running_balance: f64,
    pub kind: TransactionKind,
}

/// A discrete event taken from one of the nested `alarm` / `door` mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEvent {
    // ---
    /// Raw nested key, `YYYY-MM-DD_HH-mm-ss` when well formed.
    pub timestamp: String,
    pub event: String,
}

pub type AlarmEvent = LedgerEvent;
pub type DoorEvent = LedgerEvent;
