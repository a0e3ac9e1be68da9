//! Database queries for the web API
//!
//! Schema creation lives in `schematic_common::db`; this module holds the
//! per-table queries used by the handlers.

pub mod analysis;
pub mod schematics;
pub mod search;
pub mod users;

use chrono::{DateTime, SecondsFormat, Utc};
use schematic_common::{Error, Result};

/// Format a timestamp for storage
///
/// Fixed-width RFC 3339 in UTC, so text ordering matches time ordering.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp '{}': {}", value, e)))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON column: {}", e)))
}

fn from_json_text<T: serde::de::DeserializeOwned>(column: &str, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_round_trip_keeps_micros() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
            + chrono::Duration::microseconds(123_456);
        let text = format_timestamp(dt);
        assert_eq!(text, "2025-03-04T05:06:07.123456Z");
        assert_eq!(parse_timestamp(&text).unwrap(), dt);
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let a = format_timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let b = format_timestamp(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::microseconds(1),
        );
        assert!(a < b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
