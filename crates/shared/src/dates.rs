//! Date normalization for breach-provider payloads.
//!
//! The provider sends breach dates as plain `YYYY-MM-DD` strings, while stored
//! records and some older payloads carry full ISO-8601 timestamps such as
//! `2016-10-20T00:00:00Z`. Everything is reduced to a calendar date before any
//! comparison happens.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Error type for provider date parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Empty date value")]
    Empty,
    #[error("Unrecognized date format: {0}")]
    Unrecognized(String),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a provider date into a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (`Z` or numeric offset) and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps. For timestamps the calendar date is taken
/// as written, without shifting to UTC.
pub fn parse_breach_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| DateParseError::Unrecognized(value.to_string()))
}

/// Parses a provider timestamp (`AddedDate`, `ModifiedDate`) into UTC.
///
/// A bare date is interpreted as midnight UTC.
pub fn parse_provider_timestamp(raw: &str) -> Result<DateTime<Utc>, DateParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(dt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Ok(Utc.from_utc_datetime(&dt));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| DateParseError::Unrecognized(value.to_string()))
}

/// Serde adapter: deserialize a calendar date from any supported provider format.
pub fn deserialize_breach_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_breach_date(&raw).map_err(serde::de::Error::custom)
}

/// Serde adapter: deserialize a UTC timestamp from any supported provider format.
pub fn deserialize_provider_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_provider_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_plain_date() {
        let date = parse_breach_date("2016-10-20").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 10, 20).unwrap());
    }

    #[test]
    fn test_parse_zulu_timestamp_as_date() {
        let date = parse_breach_date("2016-10-20T00:00:00Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 10, 20).unwrap());
    }

    #[test]
    fn test_plain_and_zulu_forms_are_equal() {
        assert_eq!(
            parse_breach_date("2016-10-20").unwrap(),
            parse_breach_date("2016-10-20T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_offset_keeps_written_calendar_date() {
        let date = parse_breach_date("2020-06-29T01:30:00+02:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 6, 29).unwrap());
    }

    #[test]
    fn test_naive_timestamp() {
        let date = parse_breach_date("2020-06-29T13:45:10.250").unwrap();
        assert_eq!(date.day(), 29);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(parse_breach_date("  2016-10-20 ").is_ok());
    }

    #[test]
    fn test_empty_date() {
        assert_eq!(parse_breach_date("   "), Err(DateParseError::Empty));
    }

    #[test]
    fn test_garbage_date() {
        let err = parse_breach_date("last tuesday").unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized date format: last tuesday");
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_provider_timestamp("2017-08-07T02:51:12Z").unwrap();
        assert_eq!(ts.year(), 2017);
        assert_eq!(ts.hour(), 2);
        assert_eq!(ts.minute(), 51);
    }

    #[test]
    fn test_parse_timestamp_offset_is_normalized_to_utc() {
        let ts = parse_provider_timestamp("2017-08-07T02:51:12+02:00").unwrap();
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_from_bare_date() {
        let ts = parse_provider_timestamp("2020-06-29").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.day(), 29);
    }

    #[test]
    fn test_serde_adapter() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_breach_date")]
            date: NaiveDate,
        }

        let w: Wrapper = serde_json::from_str(r#"{"date":"2016-10-20T00:00:00Z"}"#).unwrap();
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2016, 10, 20).unwrap());

        let bad = serde_json::from_str::<Wrapper>(r#"{"date":"nope"}"#);
        assert!(bad.is_err());
    }
}
