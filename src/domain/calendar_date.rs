//! Date normalization for activity payloads.
//!
//! The activity endpoints take plain `YYYY-MM-DD` dates, so any time-of-day
//! component supplied by the caller is dropped. The date is taken as written,
//! in the offset the caller supplied, not converted to another timezone.

use crate::error::{PipeRunApiError, PipeRunResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Reduce a date or timestamp to `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns `PipeRunApiError::InvalidParams` for blank or unparseable input.
///
/// ```
/// use piperun_mcp_server::domain::to_calendar_date;
///
/// assert_eq!(to_calendar_date("2024-03-05T14:30:00Z").unwrap(), "2024-03-05");
/// assert!(to_calendar_date("").is_err());
/// ```
pub fn to_calendar_date(value: &str) -> PipeRunResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PipeRunApiError::invalid("Date is empty"));
    }

    parse_date(value)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| {
            PipeRunApiError::invalid(format!(
                "Invalid date: {}. Use ISO 8601 or YYYY-MM-DD.",
                value
            ))
        })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.date_naive());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_utc_timestamp() {
        assert_eq!(to_calendar_date("2024-03-05T14:30:00Z").unwrap(), "2024-03-05");
    }

    #[test]
    fn test_keeps_date_in_supplied_offset() {
        assert_eq!(
            to_calendar_date("2024-03-05T23:30:00-03:00").unwrap(),
            "2024-03-05"
        );
        assert_eq!(
            to_calendar_date("2024-03-05T23:30:00-0300").unwrap(),
            "2024-03-05"
        );
    }

    #[test]
    fn test_accepts_naive_forms() {
        assert_eq!(to_calendar_date("2024-03-05").unwrap(), "2024-03-05");
        assert_eq!(to_calendar_date(" 2024-03-05 ").unwrap(), "2024-03-05");
        assert_eq!(to_calendar_date("2024-03-05 09:15:00").unwrap(), "2024-03-05");
        assert_eq!(to_calendar_date("2024-03-05T09:15").unwrap(), "2024-03-05");
        assert_eq!(
            to_calendar_date("2024-03-05T09:15:00.250").unwrap(),
            "2024-03-05"
        );
        assert_eq!(to_calendar_date("2024/12/31").unwrap(), "2024-12-31");
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        for input in ["", "   ", "tomorrow", "2024-13-40", "05/03/2024x"] {
            let err = to_calendar_date(input).unwrap_err();
            assert!(
                matches!(err, PipeRunApiError::InvalidParams(_)),
                "expected invalid params for {:?}",
                input
            );
        }
    }
}
