use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::{CrmError, Result};

/// Parse a stored date or timestamp into local wall-clock time.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` and plain
/// `YYYY-MM-DD` dates (read as midnight). Anything else yields `None`.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Validate a user-supplied calendar date (YYYY-MM-DD)
pub fn parse_date_input(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CrmError::InvalidDate(raw.to_string()))
}

/// Current time in the store's timestamp format
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_dates_read_as_midnight() {
        let parsed = parse_instant("2026-03-15").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2026, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn naive_timestamps_keep_their_time() {
        let parsed = parse_instant("2026-03-15T10:30:00.250").unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "10:30:00");
    }

    #[test]
    fn rfc3339_timestamps_parse() {
        assert!(parse_instant("2026-03-15T10:30:00.000Z").is_some());
        assert!(parse_instant("2026-03-15T10:30:00+05:30").is_some());
    }

    #[test]
    fn garbage_and_blank_are_missing() {
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("   "), None);
        assert_eq!(parse_instant("next tuesday"), None);
        assert_eq!(parse_instant("2026-13-40"), None);
    }

    #[test]
    fn date_input_validation() {
        assert!(parse_date_input("2026-02-28").is_ok());
        let err = parse_date_input("28/02/2026").unwrap_err();
        assert!(matches!(err, CrmError::InvalidDate(_)));
    }
}
