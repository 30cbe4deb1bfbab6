//! Configuration loader for the `warehouse-telemetry` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, time::Duration};

use anyhow::{anyhow, Result};

use crate::alert::DEFAULT_EXPIRY;
use crate::window::DEFAULT_CAPACITY;

/// Parse an optional numeric variable with a default value.
macro_rules! parse_env {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string variable.
macro_rules! require_env {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Base URL of the realtime store's REST surface.
    pub feed_url: String,

    /// Store path delivering temperature and humidity.
    pub telemetry_path: String,

    /// Store path delivering the motion flag.
    pub motion_path: String,

    /// Store path delivering the whole warehouse ledger.
    pub ledger_path: String,

    /// Interval between feed polls.
    pub poll_interval: Duration,

    /// Number of readings kept in the rolling window.
    pub window_capacity: usize,

    /// Delay after which a motion alert clears itself.
    pub alert_expiry: Duration,

    /// Port of the published-state HTTP surface.
    pub http_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `FEED_URL` – realtime store base URL
///
/// Optional:
/// - `TELEMETRY_PATH` – telemetry path (default: `sensors`)
/// - `MOTION_PATH` – motion path (default: `sensors/motion`)
/// - `LEDGER_PATH` – ledger path (default: `warehouse`)
/// - `FEED_POLL_MS` – poll interval in milliseconds (default: 2000)
/// - `WINDOW_CAPACITY` – rolling window size (default: 100)
/// - `ALERT_EXPIRY_SECS` – motion alert duration (default: 5)
/// - `HTTP_PORT` – listen port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    load_with(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    // ---
    let feed_url = require_env!(lookup, "FEED_URL");
    let telemetry_path = lookup("TELEMETRY_PATH").unwrap_or_else(|| "sensors".to_string());
    let motion_path = lookup("MOTION_PATH").unwrap_or_else(|| "sensors/motion".to_string());
    let ledger_path = lookup("LEDGER_PATH").unwrap_or_else(|| "warehouse".to_string());
    let poll_ms = parse_env!(lookup, "FEED_POLL_MS", u64, 2_000);
    let window_capacity = parse_env!(lookup, "WINDOW_CAPACITY", usize, DEFAULT_CAPACITY);
    let alert_secs = parse_env!(lookup, "ALERT_EXPIRY_SECS", u64, DEFAULT_EXPIRY.as_secs());
    let http_port = parse_env!(lookup, "HTTP_PORT", u16, 8080);

    if window_capacity == 0 {
        return Err(anyhow!("WINDOW_CAPACITY must be at least 1"));
    }
    if poll_ms == 0 {
        return Err(anyhow!("FEED_POLL_MS must be at least 1"));
    }

    Ok(Config {
        feed_url,
        telemetry_path,
        motion_path,
        ledger_path,
        poll_interval: Duration::from_millis(poll_ms),
        window_capacity,
        alert_expiry: Duration::from_secs(alert_secs),
        http_port,
    })
}

impl Config {
    /// Feed URL with any embedded credentials masked.
    pub fn masked_feed_url(&self) -> String {
        // ---
        let url = &self.feed_url;
        let Some(at_pos) = url.rfind('@') else {
            return url.clone();
        };
        let scheme_end = url.find("://").map_or(0, |p| p + 3);
        match url[scheme_end..at_pos].rfind(':') {
            Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at_pos..]),
            None => url.clone(),
        }
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks credentials in the feed URL while showing all configuration
    /// values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  FEED_URL          : {}", self.masked_feed_url());
        tracing::info!("  TELEMETRY_PATH    : {}", self.telemetry_path);
        tracing::info!("  MOTION_PATH       : {}", self.motion_path);
        tracing::info!("  LEDGER_PATH       : {}", self.ledger_path);
        tracing::info!("  FEED_POLL_MS      : {}", self.poll_interval.as_millis());
        tracing::info!("  WINDOW_CAPACITY   : {}", self.window_capacity);
        tracing::info!("  ALERT_EXPIRY_SECS : {}", self.alert_expiry.as_secs());
        tracing::info!("  HTTP_PORT         : {}", self.http_port);
    }
}
