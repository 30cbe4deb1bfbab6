//! Codec for the ledger's `YYYY-MM-DD_HH-mm-ss` keys.
//!
//! Ledger keys are wall-clock local times written by the store. They are
//! parsed into a [`NaiveDateTime`] so that they compare chronologically, and
//! rendered back as `DD/MM/YYYY HH:MM:SS` for display. Rendering never fails:
//! a key that does not parse is returned unchanged.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

// ---

/// Display format used by [`format`].
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("expected `YYYY-MM-DD_HH-mm-ss`, got {0:?}")]
    Shape(String),

    #[error("non-numeric component {component:?} in {raw:?}")]
    NotNumeric { raw: String, component: String },

    #[error("calendar value out of range in {0:?}")]
    OutOfRange(String),
}

/// Parse a ledger key into a comparable local date-time.
pub fn parse(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    // ---
    let shape = || TimestampError::Shape(raw.to_string());

    let parts: Vec<&str> = raw.split('_').collect();
    if parts.len() != 2 {
        return Err(shape());
    }
    let date: Vec<&str> = parts[0].split('-').collect();
    let time: Vec<&str> = parts[1].split('-').collect();
    if date.len() != 3 || time.len() != 3 {
        return Err(shape());
    }

    let number = |component: &str| -> Result<u32, TimestampError> {
        // Rejects signs and whitespace that `str::parse` alone would not.
        if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimestampError::NotNumeric {
                raw: raw.to_string(),
                component: component.to_string(),
            });
        }
        component
            .parse::<u32>()
            .map_err(|_| TimestampError::OutOfRange(raw.to_string()))
    };

    let year = number(date[0])?;
    let month = number(date[1])?;
    let day = number(date[2])?;
    let hour = number(time[0])?;
    let minute = number(time[1])?;
    let second = number(time[2])?;

    let year = i32::try_from(year).map_err(|_| TimestampError::OutOfRange(raw.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| TimestampError::OutOfRange(raw.to_string()))
}

/// Render a ledger key for display, or return it unchanged if it does not parse.
pub fn format(raw: &str) -> String {
    // ---
    match parse(raw) {
        Ok(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Newest-first ordering over already-parsed keys.
///
/// Valid keys come first, latest to earliest, and equal instants compare
/// equal so a stable sort keeps their incoming order. Invalid keys sort after
/// every valid one, ordered among themselves by descending raw string.
pub fn newest_first(
    a: (Option<&NaiveDateTime>, &str),
    b: (Option<&NaiveDateTime>, &str),
) -> Ordering {
    // ---
    match (a.0, b.0) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.1.cmp(a.1),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_fields() {
        // ---
        let parsed = parse("2026-01-05_16-37-41").unwrap();
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.month(), 1);
        assert_eq!(parsed.day(), 5);
        assert_eq!(parsed.hour(), 16);
        assert_eq!(parsed.minute(), 37);
        assert_eq!(parsed.second(), 41);
    }

    #[test]
    fn test_parse_accepts_unpadded_components() {
        // ---
        assert_eq!(
            parse("2026-1-5_9-7-1").unwrap(),
            parse("2026-01-05_09-07-01").unwrap()
        );
    }

    #[test]
    fn test_parse_failures() {
        // ---
        assert!(matches!(parse("not-a-date"), Err(TimestampError::Shape(_))));
        assert!(matches!(parse("2026-01-05"), Err(TimestampError::Shape(_))));
        assert!(matches!(
            parse("2026-01-05_16-37"),
            Err(TimestampError::Shape(_))
        ));
        assert!(matches!(
            parse("2026-01-05_16-37-41_00"),
            Err(TimestampError::Shape(_))
        ));
        assert!(matches!(
            parse("2026-0x-05_16-37-41"),
            Err(TimestampError::NotNumeric { .. })
        ));
        assert!(matches!(
            parse("2026-01- 5_16-37-41"),
            Err(TimestampError::NotNumeric { .. })
        ));
        assert!(matches!(
            parse("2026-13-05_16-37-41"),
            Err(TimestampError::OutOfRange(_))
        ));
        assert!(matches!(
            parse("2026-02-30_16-37-41"),
            Err(TimestampError::OutOfRange(_))
        ));
        assert!(matches!(
            parse("2026-01-05_24-00-00"),
            Err(TimestampError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_extra_separator_is_a_shape_error() {
        // ---
        let raw = "2026-01-05_16-37-41_00";
        assert_eq!(parse(raw), Err(TimestampError::Shape(raw.to_string())));
        assert!(matches!(
            parse("_2026-01-05_16-37-41"),
            Err(TimestampError::Shape(_))
        ));
        assert_eq!(format(raw), raw);
    }

    #[test]
    fn test_format_renders_display_string() {
        // ---
        assert_eq!(format("2025-12-20_20-11-20"), "20/12/2025 20:11:20");
    }

    #[test]
    fn test_format_falls_back_to_input() {
        // ---
        for raw in ["not-a-date", "", "2026-13-01_00-00-00", "alarm", "2026_01"] {
            assert_eq!(format(raw), raw);
        }
    }

    #[test]
    fn test_newest_first() {
        // ---
        let early = parse("2025-12-20_20-11-20").unwrap();
        let late = parse("2026-01-05_16-37-41").unwrap();

        assert_eq!(
            newest_first((Some(&late), "b"), (Some(&early), "a")),
            Ordering::Less
        );
        assert_eq!(
            newest_first((Some(&early), "a"), (None, "zzz")),
            Ordering::Less
        );
        assert_eq!(
            newest_first((None, "zzz"), (Some(&early), "a")),
            Ordering::Greater
        );
        assert_eq!(
            newest_first((Some(&late), "x"), (Some(&late), "y")),
            Ordering::Equal
        );
        assert_eq!(newest_first((None, "b"), (None, "a")), Ordering::Less);
    }
}
