//! Threshold classification of current storage conditions.

use std::fmt;

use serde::Serialize;

// ---

/// Inclusive temperature band (°C) for [`Status::Optimal`].
pub const OPTIMAL_TEMPERATURE: (f64, f64) = (16.0, 26.0);
/// Inclusive humidity band (%) for [`Status::Optimal`].
pub const OPTIMAL_HUMIDITY: (f64, f64) = (30.0, 60.0);
/// Inclusive temperature band (°C) for [`Status::Warning`].
pub const WARNING_TEMPERATURE: (f64, f64) = (12.0, 30.0);
/// Inclusive humidity band (%) for [`Status::Warning`].
pub const WARNING_HUMIDITY: (f64, f64) = (20.0, 70.0);

/// Environmental status, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Optimal,
    Warning,
    Critical,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Optimal => "optimal",
            Status::Warning => "warning",
            Status::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Classify a temperature/humidity pair.
///
/// Both dimensions must sit inside a band for that band to apply; the optimal
/// band is checked first, then the warning band, and everything else is
/// critical. NaN fails every comparison and so classifies as
/// [`Status::Critical`].
pub fn classify(temperature: f64, humidity: f64) -> Status {
    // ---
    if within(temperature, OPTIMAL_TEMPERATURE) && within(humidity, OPTIMAL_HUMIDITY) {
        Status::Optimal
    } else if within(temperature, WARNING_TEMPERATURE) && within(humidity, WARNING_HUMIDITY) {
        Status::Warning
    } else {
        Status::Critical
    }
}

fn within(value: f64, (low, high): (f64, f64)) -> bool {
    low <= value && value <= high
}
