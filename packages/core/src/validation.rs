// ABOUTME: Input validation applied before any database write
// ABOUTME: Required-field checks shared by tool, supervisor, project and review inputs

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("{0} must be a JSON document, got null")]
    MissingDocument(&'static str),
    #[error("{messages} messages supplied for {tool_requests} tool requests")]
    LengthMismatch {
        messages: usize,
        tool_requests: usize,
    },
    #[error("{0} must fall within the years 0000 to 9999")]
    TimestampOutOfRange(&'static str),
}

/// Reject empty or whitespace-only strings
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Reject a JSON null where a structured document is required
pub fn require_document(field: &'static str, value: &Value) -> Result<(), ValidationError> {
    if value.is_null() {
        return Err(ValidationError::MissingDocument(field));
    }
    Ok(())
}

/// Reject timestamps whose stored text would not be four-digit-year fixed width
pub fn require_storable_timestamp(
    field: &'static str,
    value: &DateTime<Utc>,
) -> Result<(), ValidationError> {
    if !(0..=9999).contains(&value.year()) {
        return Err(ValidationError::TimestampOutOfRange(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "bash").is_ok());
        assert_eq!(
            require_non_empty("name", "   "),
            Err(ValidationError::EmptyField("name"))
        );
        assert_eq!(
            require_non_empty("code", ""),
            Err(ValidationError::EmptyField("code"))
        );
    }

    #[test]
    fn test_require_document() {
        assert!(require_document("attributes", &json!({})).is_ok());
        assert!(require_document("attributes", &json!([])).is_ok());
        assert_eq!(
            require_document("attributes", &Value::Null),
            Err(ValidationError::MissingDocument("attributes"))
        );
    }

    #[test]
    fn test_require_storable_timestamp() {
        let first = Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        assert!(require_storable_timestamp("status time", &first).is_ok());
        assert!(require_storable_timestamp("status time", &last).is_ok());

        let too_late = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let too_early = Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(
            require_storable_timestamp("status time", &too_late),
            Err(ValidationError::TimestampOutOfRange("status time"))
        );
        assert_eq!(
            require_storable_timestamp("status time", &too_early),
            Err(ValidationError::TimestampOutOfRange("status time"))
        );
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = ValidationError::LengthMismatch {
            messages: 2,
            tool_requests: 3,
        };
        assert_eq!(
            err.to_string(),
            "2 messages supplied for 3 tool requests"
        );
    }
}
