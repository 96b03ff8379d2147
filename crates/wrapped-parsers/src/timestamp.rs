//! Timestamp decoding shared by the platform parsers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Numbers above this are treated as milliseconds rather than seconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// A timestamp as it appears in an export: epoch number or date string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Epoch(f64),
    Text(String),
}

impl RawTimestamp {
    /// Resolve to an instant, or `None` when the value is unusable.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Epoch(value) => from_epoch_number(*value),
            RawTimestamp::Text(text) => parse_text(text),
        }
    }
}

/// Convert fractional epoch seconds to an instant.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

fn from_epoch_number(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    if value.abs() > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value.round() as i64)
    } else {
        from_epoch_seconds(value)
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    text.parse::<f64>().ok().and_then(from_epoch_number)
}
