// ABOUTME: Shared utility functions for Sentinel
// ABOUTME: ID generation and the canonical timestamp encoding used in the database

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use uuid::Uuid;

/// Generate a new globally unique identifier for a stored row
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Encode a timestamp for storage.
///
/// The output is fixed width (microsecond precision, `Z` suffix) so that
/// string comparison in SQL orders rows chronologically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drop sub-microsecond precision so a value survives a storage round trip unchanged
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Current time at storage precision
pub fn now() -> DateTime<Utc> {
    truncate_to_micros(Utc::now())
}

/// Decode a timestamp written by [`format_timestamp`] (or any RFC 3339 string)
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();

        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(&id1).is_ok());
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let fractional = whole + Duration::microseconds(1);

        let a = format_timestamp(whole);
        let b = format_timestamp(fractional);

        assert_eq!(a, "2024-05-01T12:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
            + Duration::microseconds(123_456);

        let parsed = parse_timestamp(&format_timestamp(ts)).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_now_survives_roundtrip() {
        let ts = now();
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let parsed = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }
}
