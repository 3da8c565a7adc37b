//! Total parsing functions for inbound fields.
//!
//! Ingestion never rejects a payload for a bad optional field. Each function
//! here maps any JSON value to a defined result and logs when it had to fall
//! back.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{defaults, events};
use crate::types::SignalAction;

/// Trimmed ticker, or `UNKNOWN` when absent, blank or not a string.
pub fn ticker(value: &Value) -> String {
    match value.as_str().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            debug!(event = events::FIELD_DEFAULTED, field = "ticker", raw = %value);
            defaults::UNKNOWN_TICKER.to_string()
        }
    }
}

/// `buy` / `sell`, case-insensitive. Anything else is treated as buy.
pub fn action(value: &Value) -> SignalAction {
    let parsed = value.as_str().map(|s| s.trim().to_ascii_lowercase());
    match parsed.as_deref() {
        Some("buy") => SignalAction::Buy,
        Some("sell") => SignalAction::Sell,
        _ => {
            if value.is_null() {
                debug!(
                    event = events::FIELD_DEFAULTED,
                    field = "action",
                    "action missing, using buy"
                );
            } else {
                // Likely an upstream payload bug; keep it visible.
                warn!(
                    event = events::FIELD_DEFAULTED,
                    field = "action",
                    raw = %value,
                    "unrecognized action, treating as buy"
                );
            }
            SignalAction::Buy
        }
    }
}

/// Finite number or numeric string, else 0.
pub fn price(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed.filter(|p| p.is_finite()) {
        Some(p) => p,
        None => {
            debug!(event = events::FIELD_DEFAULTED, field = "price", raw = %value);
            defaults::PRICE
        }
    }
}

/// RFC 3339 string or unix epoch (seconds, or milliseconds at or above
/// 1e11), else `fallback`.
pub fn timestamp(value: &Value, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let parsed = match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_epoch))
        }
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        _ => None,
    };
    match parsed {
        Some(ts) => ts,
        None => {
            if !value.is_null() {
                debug!(event = events::FIELD_DEFAULTED, field = "timestamp", raw = %value);
            }
            fallback
        }
    }
}

fn from_epoch(n: f64) -> Option<DateTime<Utc>> {
    let micros = if n.abs() >= defaults::EPOCH_MILLIS_THRESHOLD {
        n * 1_000.0
    } else {
        n * 1_000_000.0
    };
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// A credential counts as present when it has a non-blank value.
pub fn credential(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

/// Analyst identity, `Anonymous` when empty. A non-blank name is kept
/// exactly as given.
pub fn analyst(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => defaults::ANONYMOUS.to_string(),
    }
}
