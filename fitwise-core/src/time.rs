//! Time utilities: timezone-aware due dates and whole-day arithmetic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{FitwiseError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a due date like "2026-02-20 23:59" (or a bare "2026-02-20", read as
/// end of day) in an IANA tz like "America/Chicago", returning UTC.
pub fn parse_local_due_to_utc(local: &str, tz: &str) -> Result<DateTime<Utc>> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| FitwiseError::validation(format!("invalid timezone: {tz}")))?;

    let trimmed = local.trim();
    let ndt = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M")
        .or_else(|_| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(23, 59, 0).unwrap_or_default())
        })
        .map_err(|e| FitwiseError::validation(format!("invalid due date '{trimmed}': {e}")))?;

    let local_dt = tz.from_local_datetime(&ndt).single().ok_or_else(|| {
        FitwiseError::validation(format!("ambiguous or invalid local time (DST?): {trimmed} {tz}"))
    })?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Whole days until `due`, rounded up; negative once the due date has passed.
pub fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds() as f64;
    (seconds / SECONDS_PER_DAY).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parse_chicago_due_date() {
        // Feb is CST (UTC-6)
        let utc = parse_local_due_to_utc("2026-02-20 23:59", "America/Chicago").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn bare_date_is_end_of_day() {
        let utc = parse_local_due_to_utc("2026-02-20", "UTC").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-20T23:59:00+00:00");
    }

    #[test]
    fn bad_timezone_is_validation_error() {
        let err = parse_local_due_to_utc("2026-02-20", "Mars/Olympus").unwrap_err();
        assert_eq!(err.code(), "validation_failed");
    }

    #[test]
    fn days_until_rounds_up() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_until(now, now + Duration::hours(25)), 2);
        assert_eq!(days_until(now, now + Duration::days(1)), 1);
        assert_eq!(days_until(now, now - Duration::hours(30)), -1);
    }
}
