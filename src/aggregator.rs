//! Orchestration of the telemetry, motion and ledger streams.
//!
//! [`TelemetryAggregator`] is the single entry point for feed deliveries. It
//! decodes each snapshot, updates the rolling window, classifies conditions,
//! reconciles the ledger, and publishes the derived state on `watch`
//! channels so any number of readers can observe the latest values.
//!
//! Each stream is serialised independently: telemetry updates go through the
//! window lock, motion and ledger updates through their own channels, so a
//! slow stream never blocks another. Every published tuple is replaced in one
//! step and readers never see a half-applied update.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::alert::AlertTimer;
use crate::feed::{FeedError, FeedEvent};
use crate::models::{AlarmEvent, DoorEvent, SensorReading, Transaction};
use crate::reconcile::reconcile;
use crate::snapshot::{self, LedgerSnapshot, TelemetrySnapshot};
use crate::status::{classify, Status};
use crate::window::{RollingWindow, WindowStats};

// ---

/// Latest environmental state, published as one tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryState {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub status: Status,
    pub last_updated: Option<DateTime<Utc>>,
    pub loading: bool,
    pub stats: WindowStats,
}

impl Default for TelemetryState {
    fn default() -> Self {
        // ---
        Self {
            temperature: 0.0,
            humidity: 0.0,
            status: classify(0.0, 0.0),
            last_updated: None,
            loading: true,
            stats: WindowStats::default(),
        }
    }
}

/// Latest reconciled ledger, published as one tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerState {
    // ---
    pub quantity: Option<f64>,
    pub alarms: Vec<AlarmEvent>,
    pub doors: Vec<DoorEvent>,
    pub transactions: Vec<Transaction>,
    pub loading: bool,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            quantity: None,
            alarms: Vec::new(),
            doors: Vec::new(),
            transactions: Vec::new(),
            loading: true,
        }
    }
}

/// The feed paths the aggregator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Telemetry,
    Motion,
    Ledger,
}

pub struct TelemetryAggregator {
    window: Mutex<RollingWindow>,
    telemetry: watch::Sender<TelemetryState>,
    motion: watch::Sender<bool>,
    ledger: watch::Sender<LedgerState>,
    alert: AlertTimer,
}

impl TelemetryAggregator {
    pub fn new(window_capacity: usize, alert_expiry: Duration) -> Self {
        // ---
        let (telemetry, _) = watch::channel(TelemetryState::default());
        let (motion, _) = watch::channel(false);
        let (ledger, _) = watch::channel(LedgerState::default());

        Self {
            window: Mutex::new(RollingWindow::new(window_capacity)),
            telemetry,
            motion,
            ledger,
            alert: AlertTimer::new(alert_expiry),
        }
    }

    /// Route one feed delivery to the entry point for its stream.
    pub fn apply(&self, stream: Stream, event: FeedEvent) {
        // ---
        match (stream, event) {
            (Stream::Telemetry, Ok(snapshot)) => self.ingest(&snapshot),
            (Stream::Telemetry, Err(e)) => self.ingest_error(&e),
            (Stream::Motion, Ok(snapshot)) => self.ingest_motion(&snapshot),
            (Stream::Motion, Err(e)) => warn!("Motion feed error: {}", e),
            (Stream::Ledger, Ok(snapshot)) => self.ingest_ledger(&snapshot),
            (Stream::Ledger, Err(e)) => self.ingest_ledger_error(&e),
        }
    }

    /// Apply a telemetry snapshot.
    ///
    /// Missing or non-numeric fields count as `0`. The window push and the
    /// publish happen under the window lock so concurrent deliveries are
    /// applied one at a time in the order they acquire it.
    pub fn ingest(&self, snapshot: &Value) {
        // ---
        let decoded = TelemetrySnapshot::decode(snapshot);
        let status = classify(decoded.temperature, decoded.humidity);

        let mut window = self.window.lock();
        // Stamped under the lock so capture times follow window order.
        let now = Utc::now();
        window.push(SensorReading::new(decoded.temperature, decoded.humidity, now));
        let stats = window.stats();

        let previous = self.telemetry.send_replace(TelemetryState {
            temperature: decoded.temperature,
            humidity: decoded.humidity,
            status,
            last_updated: Some(now),
            loading: false,
            stats,
        });
        drop(window);

        if previous.status != status && previous.last_updated.is_some() {
            info!("Status changed from {} to {}", previous.status, status);
        }
        debug!(
            "Ingested reading: {:.2}°C, {:.2}% -> {}",
            decoded.temperature, decoded.humidity, status
        );
    }

    /// Record a transport failure on the telemetry stream.
    ///
    /// Only the loading flag changes; the last good values stay published.
    pub fn ingest_error(&self, error: &FeedError) {
        // ---
        warn!("Telemetry feed error, keeping last known values: {}", error);
        let _window = self.window.lock();
        self.telemetry.send_modify(|state| state.loading = false);
    }

    /// Apply a motion snapshot. A `true` reading raises the motion alert.
    ///
    /// The motion flag is always published. The alert needs a Tokio runtime
    /// for its expiry timer and stays down when called outside one.
    pub fn ingest_motion(&self, snapshot: &Value) {
        // ---
        let detected = snapshot::decode_motion(snapshot);
        self.motion.send_replace(detected);
        if detected {
            info!("Motion detected, raising alert");
            self.alert.trigger();
        }
    }

    /// Apply a whole-ledger snapshot.
    ///
    /// Sequences whose source is absent from the snapshot keep their
    /// previously published value.
    pub fn ingest_ledger(&self, snapshot: &Value) {
        // ---
        let decoded = LedgerSnapshot::decode(snapshot);
        let reconciled = decoded.history.map(reconcile).unwrap_or_default();

        self.ledger.send_modify(|state| {
            if let Some(quantity) = decoded.quantity {
                state.quantity = Some(quantity);
            }
            if let Some(alarms) = reconciled.alarms {
                state.alarms = alarms;
            }
            if let Some(doors) = reconciled.doors {
                state.doors = doors;
            }
            if let Some(transactions) = reconciled.transactions {
                state.transactions = transactions;
            }
            state.loading = false;
        });
    }

    pub fn ingest_ledger_error(&self, error: &FeedError) {
        // ---
        warn!("Ledger feed error, keeping last known ledger: {}", error);
        self.ledger.send_modify(|state| state.loading = false);
    }

    /// Drop every reading from the rolling window and republish zeroed stats.
    pub fn clear_window(&self) {
        // ---
        let mut window = self.window.lock();
        window.clear();
        self.telemetry
            .send_modify(|state| state.stats = WindowStats::default());
        info!("Rolling window cleared");
    }

    /// Copy of the rolling window, oldest first.
    pub fn window_snapshot(&self) -> Vec<SensorReading> {
        self.window.lock().all()
    }

    pub fn telemetry(&self) -> TelemetryState {
        self.telemetry.borrow().clone()
    }

    pub fn ledger(&self) -> LedgerState {
        self.ledger.borrow().clone()
    }

    pub fn motion(&self) -> bool {
        *self.motion.borrow()
    }

    pub fn alert_raised(&self) -> bool {
        self.alert.is_raised()
    }

    pub fn subscribe_telemetry(&self) -> watch::Receiver<TelemetryState> {
        self.telemetry.subscribe()
    }

    pub fn subscribe_ledger(&self) -> watch::Receiver<LedgerState> {
        self.ledger.subscribe()
    }

    pub fn subscribe_motion(&self) -> watch::Receiver<bool> {
        self.motion.subscribe()
    }

    pub fn subscribe_alert(&self) -> watch::Receiver<bool> {
        self.alert.subscribe()
    }
}
