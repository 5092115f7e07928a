//! Date and time parsing for request payloads
//!
//! Reservation times are wall-clock times of the restaurant, so everything
//! here works on naive (zone-less) values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::{AppError, AppResult, ErrorCode};

/// Default seating time when only a date is given
pub const DEFAULT_SEATING_TIME: NaiveTime = match NaiveTime::from_hms_opt(19, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a reservation start time.
///
/// Accepts RFC 3339 (the offset is dropped and the wall-clock time kept),
/// `YYYY-MM-DDTHH:MM[:SS]`, or a bare `YYYY-MM-DD`, which is seated at
/// [`DEFAULT_SEATING_TIME`].
pub fn parse_date_time(value: &str) -> AppResult<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(DEFAULT_SEATING_TIME));
    }

    Err(AppError::with_message(
        ErrorCode::InvalidFormat,
        format!("Invalid date: {value}"),
    ))
}

/// Parse a calendar date; any time-of-day part is ignored
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    parse_date_time(value).map(|dt| dt.date())
}

/// Today's date in the server's local time zone
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_variants() {
        let dt = parse_date_time("2030-05-01T19:30").unwrap();
        assert_eq!(dt.date(), ymd(2030, 5, 1));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(19, 30, 0).unwrap());

        let dt = parse_date_time("2030-05-01T19:30:15").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(19, 30, 15).unwrap());

        let dt = parse_date_time("2030-05-01").unwrap();
        assert_eq!(dt.time(), DEFAULT_SEATING_TIME);
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        let dt = parse_date_time("2030-05-01T23:30:00+02:00").unwrap();
        assert_eq!(dt.date(), ymd(2030, 5, 1));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(23, 30, 0).unwrap());

        let dt = parse_date_time("2030-05-01T12:00:00.000Z").unwrap();
        assert_eq!(dt.date(), ymd(2030, 5, 1));
    }

    #[test]
    fn test_parse_date_ignores_time() {
        assert_eq!(parse_date("2030-05-01T23:59").unwrap(), ymd(2030, 5, 1));
    }

    #[test]
    fn test_invalid() {
        let err = parse_date_time("tomorrow").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(parse_date("2030-13-01").is_err());
    }
}
