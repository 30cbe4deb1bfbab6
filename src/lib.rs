//! Telemetry aggregation and ledger reconciliation for warehouse sensors.
//!
//! The crate turns raw snapshots from a realtime store into:
//! - a bounded rolling window of temperature/humidity readings with
//!   statistics ([`window`]),
//! - a three-level status of current conditions ([`status`]),
//! - newest-first alarm, door and transaction histories reconciled from one
//!   flat ledger mapping ([`reconcile`], [`timestamp`]).
//!
//! [`TelemetryAggregator`] ties these together and publishes the results on
//! `watch` channels; [`feed`] and [`pipeline`] connect it to the store, and
//! [`routes`] exposes the published state over HTTP.

pub mod aggregator;
pub mod alert;
pub mod config;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod routes;
pub mod snapshot;
pub mod status;
pub mod timestamp;
pub mod window;

pub use aggregator::{LedgerState, Stream, TelemetryAggregator, TelemetryState};
pub use config::Config;

// Types used by routes/*.rs are re-exported here; routes import types from
// the crate root and only name modules for free functions.
pub use models::{AlarmEvent, DoorEvent, LedgerEvent, SensorReading, Transaction, TransactionKind};
pub use status::Status;
pub use window::{RollingWindow, WindowStats};
