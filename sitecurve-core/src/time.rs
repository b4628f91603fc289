//! Time utilities: inclusive day counts and timezone-aware "as of" dates.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{CurveError, Result};

/// Inclusive day count of `[start, end]`. Zero or negative when `end < start`.
pub fn days_between_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Parse an IANA timezone name like "Asia/Bangkok".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| CurveError::invalid(format!("invalid timezone: {tz}")))
}

/// Today's calendar date in the given timezone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse an "as of" argument: either `YYYY-MM-DD` or an RFC3339 timestamp,
/// the latter converted to the project's local date.
pub fn parse_as_of(s: &str, tz: Tz) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .map_err(|e| CurveError::invalid(format!("invalid as-of '{s}': {e}")))
}

/// Convert a millisecond epoch timestamp into the project's local date.
///
/// Fails fast on NaN, infinities and timestamps outside chrono's range.
pub fn as_of_from_timestamp_millis(ms: f64, tz: Tz) -> Result<NaiveDate> {
    if !ms.is_finite() {
        return Err(CurveError::invalid(format!("as_of timestamp is not finite: {ms}")));
    }
    let dt = DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)
        .ok_or_else(|| CurveError::invalid(format!("as_of timestamp out of range: {ms}")))?;
    Ok(dt.with_timezone(&tz).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inclusive_day_counts() {
        assert_eq!(days_between_inclusive(d(2024, 1, 1), d(2024, 1, 10)), 10);
        assert_eq!(days_between_inclusive(d(2024, 1, 1), d(2024, 1, 1)), 1);
        assert_eq!(days_between_inclusive(d(2024, 1, 5), d(2024, 1, 1)), -3);
    }

    #[test]
    fn rfc3339_as_of_uses_project_timezone() {
        let tz = parse_timezone("Asia/Bangkok").unwrap();
        // 20:00 UTC on Jan 5 is already Jan 6 in Bangkok (UTC+7).
        let as_of = parse_as_of("2024-01-05T20:00:00Z", tz).unwrap();
        assert_eq!(as_of, d(2024, 1, 6));
        assert_eq!(parse_as_of("2024-01-05", tz).unwrap(), d(2024, 1, 5));
    }

    #[test]
    fn non_finite_timestamp_is_invalid_argument() {
        let tz = parse_timezone("UTC").unwrap();
        assert!(matches!(
            as_of_from_timestamp_millis(f64::NAN, tz),
            Err(CurveError::InvalidArgument(_))
        ));
        assert!(as_of_from_timestamp_millis(f64::INFINITY, tz).is_err());
        assert!(as_of_from_timestamp_millis(1e300, tz).is_err());

        // 2024-01-15T00:00:00Z
        let ok = as_of_from_timestamp_millis(1_705_276_800_000.0, tz).unwrap();
        assert_eq!(ok, d(2024, 1, 15));
    }

    #[test]
    fn bad_timezone_rejected() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
