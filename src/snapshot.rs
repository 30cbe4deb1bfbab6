//! Decoding of raw feed snapshots into typed values.
//!
//! The realtime store delivers untyped JSON trees whose numeric fields may be
//! numbers or strings and whose optional fields may be missing entirely. All
//! permissive coercion lives here: the rest of the engine only ever sees the
//! typed results, with malformed values already replaced by safe defaults.

use serde_json::{Map, Value};

use crate::models::{LedgerEvent, Transaction, TransactionKind};

// ---

/// Reserved ledger key holding the nested alarm history.
pub const ALARM_KEY: &str = "alarm";
/// Reserved ledger key holding the nested door history.
pub const DOOR_KEY: &str = "door";
/// Label used for an alarm record without an `event` field.
pub const DEFAULT_ALARM_EVENT: &str = "ALARM";
/// Label used for a door record without an `event` field.
pub const DEFAULT_DOOR_EVENT: &str = "OPEN";

/// Coerce a JSON value into a finite number.
///
/// Numbers are taken as-is, strings are trimmed and parsed. Missing values,
/// other JSON types, unparsable strings and non-finite results all become `0`.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    // ---
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Coerce a JSON value into a boolean flag.
///
/// Accepts booleans, non-zero numbers and the strings `true`, `1`, `on`
/// (case-insensitive). Everything else is `false`.
pub fn coerce_flag(value: Option<&Value>) -> bool {
    // ---
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "on"
        ),
        _ => false,
    }
}

/// Temperature and humidity extracted from a telemetry snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub temperature: f64,
    pub humidity: f64,
}

impl TelemetrySnapshot {
    pub fn decode(snapshot: &Value) -> Self {
        // ---
        Self {
            temperature: coerce_number(snapshot.get("temperature")),
            humidity: coerce_number(snapshot.get("humidity")),
        }
    }
}

/// Motion flag from a motion snapshot: either a bare value or `{ "motion": .. }`.
pub fn decode_motion(snapshot: &Value) -> bool {
    // ---
    match snapshot {
        Value::Object(fields) => coerce_flag(fields.get("motion")),
        other => coerce_flag(Some(other)),
    }
}

/// Whole-ledger snapshot: current stock quantity plus the keyed history.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerSnapshot<'a> {
    pub quantity: Option<f64>,
    pub history: Option<&'a Map<String, Value>>,
}

impl<'a> LedgerSnapshot<'a> {
    pub fn decode(snapshot: &'a Value) -> Self {
        // ---
        Self {
            quantity: snapshot
                .get("quantity")
                .filter(|v| !v.is_null())
                .map(|v| coerce_number(Some(v))),
            history: snapshot.get("history").and_then(Value::as_object),
        }
    }
}

/// One top-level entry of a ledger history, classified by key and shape.
#[derive(Debug)]
pub enum LedgerEntry<'a> {
    Alarms(&'a Map<String, Value>),
    Doors(&'a Map<String, Value>),
    Transaction(Transaction),
    Skipped,
}

impl<'a> LedgerEntry<'a> {
    pub fn decode(key: &str, record: &'a Value) -> Self {
        // ---
        match key {
            ALARM_KEY => record
                .as_object()
                .map_or(LedgerEntry::Skipped, LedgerEntry::Alarms),
            DOOR_KEY => record
                .as_object()
                .map_or(LedgerEntry::Skipped, LedgerEntry::Doors),
            _ => decode_transaction(key, record)
                .map_or(LedgerEntry::Skipped, LedgerEntry::Transaction),
        }
    }
}

/// Decode a transaction record, or `None` if it exposes no ledger fields.
pub fn decode_transaction(key: &str, record: &Value) -> Option<Transaction> {
    // ---
    let fields = record.as_object()?;
    let present = |name: &str| fields.get(name).filter(|v| !v.is_null());
    let balance = present("ton_sau").or_else(|| present("runningBalance"));
    if !fields.contains_key("amount") && balance.is_none() {
        return None;
    }

    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .map(TransactionKind::from_label)
        .unwrap_or_default();

    Some(Transaction {
        date: key.to_string(),
        amount: coerce_number(fields.get("amount")),
        running_balance: coerce_number(balance),
        kind,
    })
}

/// Decode a nested alarm/door record.
///
/// Only a missing or null `event` takes the default label. Strings are kept
/// as-is (including empty ones), other scalars are stringified, and nested
/// objects or arrays fall back to the default.
pub fn decode_event(key: &str, record: &Value, default_event: &str) -> LedgerEvent {
    // ---
    let event = match record.get("event") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default_event.to_string(),
    };

    LedgerEvent {
        timestamp: key.to_string(),
        event,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        // ---
        assert_eq!(coerce_number(Some(&json!(21.5))), 21.5);
        assert_eq!(coerce_number(Some(&json!(" 48.2 "))), 48.2);
        assert_eq!(coerce_number(Some(&json!("warm"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_number(Some(&json!(null))), 0.0);
        assert_eq!(coerce_number(Some(&json!(true))), 0.0);
        assert_eq!(coerce_number(None), 0.0);
    }

    #[test]
    fn test_coerce_flag() {
        // ---
        assert!(coerce_flag(Some(&json!(true))));
        assert!(coerce_flag(Some(&json!(1))));
        assert!(coerce_flag(Some(&json!("TRUE"))));
        assert!(!coerce_flag(Some(&json!(0))));
        assert!(!coerce_flag(Some(&json!("false"))));
        assert!(!coerce_flag(None));
    }

    #[test]
    fn test_telemetry_snapshot_defaults() {
        // ---
        let decoded =
            TelemetrySnapshot::decode(&json!({"temperature": "22.4", "motion": true}));
        assert_eq!(decoded.temperature, 22.4);
        assert_eq!(decoded.humidity, 0.0);

        let decoded = TelemetrySnapshot::decode(&json!("garbage"));
        assert_eq!(
            decoded,
            TelemetrySnapshot {
                temperature: 0.0,
                humidity: 0.0
            }
        );
    }

    #[test]
    fn test_decode_motion_shapes() {
        // ---
        assert!(decode_motion(&json!(true)));
        assert!(decode_motion(&json!({"motion": 1})));
        assert!(!decode_motion(&json!({"temperature": 20})));
        assert!(!decode_motion(&json!(null)));
    }

    #[test]
    fn test_ledger_snapshot() {
        // ---
        let raw = json!({"quantity": "120", "history": {"alarm": {}}});
        let decoded = LedgerSnapshot::decode(&raw);
        assert_eq!(decoded.quantity, Some(120.0));
        assert!(decoded.history.is_some());

        let raw = json!({"quantity": null});
        let decoded = LedgerSnapshot::decode(&raw);
        assert_eq!(decoded.quantity, None);
        assert!(decoded.history.is_none());
    }

    #[test]
    fn test_transaction_defaults() {
        // ---
        let tx = decode_transaction("2025-12-20_20-11-20", &json!({"amount": "lots"})).unwrap();
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.running_balance, 0.0);
        assert_eq!(tx.kind, TransactionKind::Inbound);

        let tx = decode_transaction(
            "2025-12-21_08-00-00",
            &json!({"amount": 30, "runningBalance": 120, "type": "XUAT"}),
        )
        .unwrap();
        assert_eq!(tx.running_balance, 120.0);
        assert_eq!(tx.kind, TransactionKind::Outbound);
    }

    #[test]
    fn test_null_balance_falls_through() {
        // ---
        let tx = decode_transaction(
            "2025-12-20_20-11-20",
            &json!({"amount": 5, "ton_sau": null, "runningBalance": 120}),
        )
        .unwrap();
        assert_eq!(tx.running_balance, 120.0);

        let tx = decode_transaction(
            "2025-12-20_20-11-20",
            &json!({"amount": 5, "ton_sau": null, "runningBalance": null}),
        )
        .unwrap();
        assert_eq!(tx.running_balance, 0.0);

        // A null balance alone does not make a record a transaction
        assert!(decode_transaction("2025-12-20_20-11-20", &json!({"ton_sau": null})).is_none());
    }

    #[test]
    fn test_non_ledger_records_are_skipped() {
        // ---
        assert!(decode_transaction("quantity", &json!(120)).is_none());
        assert!(decode_transaction("meta", &json!({"owner": "north"})).is_none());
        assert!(matches!(
            LedgerEntry::decode("alarm", &json!("not a mapping")),
            LedgerEntry::Skipped
        ));
    }

    #[test]
    fn test_event_default_label() {
        // ---
        let event = decode_event("2026-01-05_16-37-41", &json!({}), DEFAULT_ALARM_EVENT);
        assert_eq!(event.event, "ALARM");

        let event = decode_event(
            "2026-01-05_16-30-00",
            &json!({"event": "CLOSE"}),
            DEFAULT_DOOR_EVENT,
        );
        assert_eq!(event.event, "CLOSE");

        let event = decode_event("2026-01-05_16-30-00", &json!(true), DEFAULT_DOOR_EVENT);
        assert_eq!(event.event, "OPEN");

        let event = decode_event(
            "2026-01-05_16-30-00",
            &json!({"event": null}),
            DEFAULT_DOOR_EVENT,
        );
        assert_eq!(event.event, "OPEN");
    }

    #[test]
    fn test_event_label_kept_when_present() {
        // ---
        let event = decode_event(
            "2026-01-05_16-37-41",
            &json!({"event": ""}),
            DEFAULT_ALARM_EVENT,
        );
        assert_eq!(event.event, "");

        let event = decode_event(
            "2026-01-05_16-37-41",
            &json!({"event": 7}),
            DEFAULT_ALARM_EVENT,
        );
        assert_eq!(event.event, "7");

        let event = decode_event(
            "2026-01-05_16-37-41",
            &json!({"event": {"code": 7}}),
            DEFAULT_ALARM_EVENT,
        );
        assert_eq!(event.event, "ALARM");
    }
}
