//! Timestamp parsing shared by step inputs and assertions.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::{DomainError, DomainResult};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses an offset-aware timestamp.
///
/// Accepts RFC 3339 first, then a space separated date and time with an
/// offset. Text without an offset is read as UTC; a bare date is midnight UTC.
///
/// # Errors
///
/// Returns [`DomainError::InvalidTimestamp`] if no format matches.
pub fn parse_timestamp(text: &str) -> DomainResult<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed);
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().fixed_offset());
        }
    }

    Err(DomainError::InvalidTimestamp(text.to_string()))
}

/// Parses a timestamp and converts it to UTC.
///
/// # Errors
///
/// Returns [`DomainError::InvalidTimestamp`] if the text cannot be parsed.
pub fn parse_utc(text: &str) -> DomainResult<DateTime<Utc>> {
    parse_timestamp(text).map(|parsed| parsed.with_timezone(&Utc))
}

/// Returns true when both timestamps denote the same instant with the same offset.
#[must_use]
pub fn same_instant_and_offset(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> bool {
    a == b && a.offset() == b.offset()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let parsed = parse_timestamp("2024-01-01T00:00:00+08:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let parsed = parse_timestamp("2024-01-01 10:30:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T10:30:00+00:00");
    }

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_utc("2024-03-05").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-05T00:00:00+00:00");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(DomainError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_same_instant_different_offset() {
        let a = parse_timestamp("2024-01-01T08:00:00+08:00").unwrap();
        let b = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
        assert!(!same_instant_and_offset(&a, &b));
        assert!(same_instant_and_offset(&a, &a.clone()));
    }
}
