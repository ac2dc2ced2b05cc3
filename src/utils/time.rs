// src/utils/time.rs

//! Conversions between ISO-8601 dates and Unix epoch seconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};

/// Format used when sending a watermark back to the search service.
const WATERMARK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an ISO-8601 date into epoch seconds.
///
/// Dates without an offset are read as UTC, which is how the search
/// service stores them.
pub fn parse_epoch(value: &str) -> Result<i64> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc().timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc().timestamp());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().timestamp());
    }

    Err(AppError::malformed_date(value))
}

/// Render epoch seconds as an ISO-8601 UTC instant.
pub fn format_epoch(epoch: i64) -> Result<String> {
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.format(WATERMARK_FORMAT).to_string())
        .ok_or_else(|| AppError::malformed_date(epoch.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_naive_datetime() {
        assert_eq!(parse_epoch("2014-06-01T00:00:00").unwrap(), 1_401_580_800);
        assert_eq!(parse_epoch("2014-05-13T16:53:20").unwrap(), 1_400_000_000);
    }

    #[test]
    fn test_parse_fractional_and_offset() {
        assert_eq!(parse_epoch("2014-06-01T00:00:00.250").unwrap(), 1_401_580_800);
        assert_eq!(parse_epoch("2014-06-01T02:00:00+02:00").unwrap(), 1_401_580_800);
        assert_eq!(parse_epoch("2014-06-01T00:00:00Z").unwrap(), 1_401_580_800);
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_epoch("2014-06-01").unwrap(), 1_401_580_800);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_epoch("last tuesday"),
            Err(AppError::MalformedDate { .. })
        ));
        assert!(parse_epoch("").is_err());
    }

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_epoch(1_400_000_000).unwrap(), "2014-05-13T16:53:20");
    }

    #[test]
    fn test_format_parse_agree() {
        let epoch = 1_234_567_890;
        assert_eq!(parse_epoch(&format_epoch(epoch).unwrap()).unwrap(), epoch);
    }
}
