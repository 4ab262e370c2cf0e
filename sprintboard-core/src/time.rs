//! Date utilities: ISO calendar dates and "today" in the user's timezone.
//!
//! The generator never reads the clock. Only consumers (overdue / upcoming
//! displays) call [`today_in`].

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, EngineResult};

pub const ISO_DATE: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string into a calendar date.
pub fn parse_iso_date(s: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE).map_err(|_| EngineError::InvalidDate {
        input: s.to_string(),
    })
}

pub fn to_iso_date(d: NaiveDate) -> String {
    d.format(ISO_DATE).to_string()
}

/// Calendar date of `now` as seen in an IANA tz like "America/Chicago".
pub fn date_in_tz(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Today's date in the given timezone, read from the system clock.
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    date_in_tz(Utc::now(), tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_iso_date() {
        let d = parse_iso_date("2024-01-03").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(to_iso_date(d), "2024-01-03");
    }

    #[test]
    fn test_parse_iso_date_rejects_garbage() {
        let err = parse_iso_date("01/03/2024").unwrap_err();
        assert!(matches!(err, EngineError::InvalidDate { .. }));
        assert!(parse_iso_date("2024-02-30").is_err());
    }

    #[test]
    fn test_date_in_chicago_rolls_back_a_day() {
        // 03:00 UTC on Jan 2 is still Jan 1 in CST (UTC-6)
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();
        let d = date_in_tz(now, "America/Chicago").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_date_in_tz_rejects_unknown_zone() {
        assert!(date_in_tz(Utc::now(), "Mars/Olympus").is_err());
    }
}
