//! Reconciliation of a flat ledger history into three typed sequences.
//!
//! The store keeps transactions as top-level siblings keyed by timestamp,
//! next to two reserved sub-mappings (`alarm`, `door`) that hold nested
//! events. [`reconcile`] partitions one such mapping and sorts every
//! partition newest first. Ordering rules are those of
//! [`timestamp::newest_first`]: invalid keys go last, and records with equal
//! instants keep the map's iteration order (lexical key order for
//! `serde_json::Map`).

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{AlarmEvent, DoorEvent, LedgerEvent, Transaction};
use crate::snapshot::{self, LedgerEntry, DEFAULT_ALARM_EVENT, DEFAULT_DOOR_EVENT};
use crate::timestamp;

// ---

/// Result of one reconciliation pass.
///
/// A `None` partition means its source was absent from the snapshot, so the
/// previously published sequence should be left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub alarms: Option<Vec<AlarmEvent>>,
    pub doors: Option<Vec<DoorEvent>>,
    pub transactions: Option<Vec<Transaction>>,
}

/// Partition and sort one ledger history mapping.
///
/// Transactions are always produced (possibly empty) since they live at the
/// top level of the mapping being reconciled. Alarm and door sequences are
/// produced only when their reserved sub-mapping is present.
pub fn reconcile(history: &Map<String, Value>) -> Reconciled {
    // ---
    let mut alarms = None;
    let mut doors = None;
    let mut transactions = Vec::new();
    let mut skipped = 0usize;

    for (key, record) in history {
        match LedgerEntry::decode(key, record) {
            LedgerEntry::Alarms(entries) => {
                alarms = Some(collect_events(entries, DEFAULT_ALARM_EVENT));
            }
            LedgerEntry::Doors(entries) => {
                doors = Some(collect_events(entries, DEFAULT_DOOR_EVENT));
            }
            LedgerEntry::Transaction(tx) => transactions.push(tx),
            LedgerEntry::Skipped => {
                debug!("Skipping ledger key {:?}: not a ledger record", key);
                skipped += 1;
            }
        }
    }

    sort_newest_first(&mut transactions, |tx| &tx.date);

    debug!(
        "Reconciled {} transactions, {} alarms, {} door events ({} keys skipped)",
        transactions.len(),
        alarms.as_ref().map_or(0, Vec::len),
        doors.as_ref().map_or(0, Vec::len),
        skipped
    );

    Reconciled {
        alarms,
        doors,
        transactions: Some(transactions),
    }
}

fn collect_events(entries: &Map<String, Value>, default_event: &str) -> Vec<LedgerEvent> {
    // ---
    let mut events: Vec<LedgerEvent> = entries
        .iter()
        .map(|(key, record)| snapshot::decode_event(key, record, default_event))
        .collect();
    sort_newest_first(&mut events, |event| &event.timestamp);
    events
}

/// Stable newest-first sort; every key is parsed exactly once.
fn sort_newest_first<T>(items: &mut Vec<T>, key: impl Fn(&T) -> &str) {
    // ---
    let mut keyed: Vec<(Option<NaiveDateTime>, T)> = items
        .drain(..)
        .map(|item| (timestamp::parse(key(&item)).ok(), item))
        .collect();

    keyed.sort_by(|(pa, a), (pb, b)| {
        timestamp::newest_first((pa.as_ref(), key(a)), (pb.as_ref(), key(b)))
    });

    items.extend(keyed.into_iter().map(|(_, item)| item));
}
