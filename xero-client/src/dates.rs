//! Wire date literal parser
//!
//! Xero payloads carry dates in two shapes depending on the representation:
//! an ISO-like `YYYY-MM-DDTHH:MM:SS` literal, and the legacy
//! `/Date(<millis>[±HHMM])/` epoch form. Both are matched against the entire
//! input; anything else — stray whitespace, a trailing `Z`, a space instead
//! of `T`, missing seconds — is simply not a date and the caller keeps the
//! original string.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:/Date\((?P<timestamp>-?\d+)(?:(?P<offset_sign>[-+])(?P<offset_h>\d{2})(?P<offset_m>\d{2}))?\)/|(?P<year>\d{4})-(?P<month>[0-2]\d)-(?P<day>[0-3]\d)T(?P<hour>[0-5]\d):(?P<minute>[0-5]\d):(?P<second>[0-6]\d))$",
    )
    .expect("wire date grammar must compile")
});

/// A successfully recognized wire date literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// A bare calendar date (ISO literal with an all-zero time of day).
    Date(NaiveDate),
    /// A wall-clock instant with no attached timezone metadata.
    DateTime(NaiveDateTime),
}

impl ParsedDate {
    /// The instant form, promoting a bare date to midnight.
    pub fn as_datetime(&self) -> NaiveDateTime {
        match self {
            ParsedDate::Date(d) => d.and_hms_opt(0, 0, 0).expect("midnight is always valid"),
            ParsedDate::DateTime(dt) => *dt,
        }
    }
}

/// Recognize one of the two wire date grammars, or return `None`.
///
/// The ISO arm yields a bare [`ParsedDate::Date`] when hour, minute and
/// second are all zero; `force_datetime` overrides that for callers that
/// always need an instant. The epoch arm starts from the UTC instant of the
/// millisecond timestamp and applies the optional `±HHMM` shift sign-aware
/// (minutes carry the sign of the offset), producing a local wall-clock
/// value. A `+0000` offset is accepted and shifts nothing.
pub fn parse_wire_date(input: &str, force_datetime: bool) -> Option<ParsedDate> {
    let caps = DATE_RE.captures(input)?;

    if let Some(ts) = caps.name("timestamp") {
        let millis: i64 = ts.as_str().parse().ok()?;
        let mut instant = DateTime::from_timestamp_millis(millis)?.naive_utc();
        if let Some(sign) = caps.name("offset_sign") {
            let hours: i64 = caps["offset_h"].parse().ok()?;
            let minutes: i64 = caps["offset_m"].parse().ok()?;
            let mut shift = Duration::hours(hours) + Duration::minutes(minutes);
            if sign.as_str() == "-" {
                shift = -shift;
            }
            instant = instant + shift;
        }
        return Some(ParsedDate::DateTime(instant));
    }

    let year: i32 = caps["year"].parse().ok()?;
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps["second"].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if hour == 0 && minute == 0 && second == 0 && !force_datetime {
        return Some(ParsedDate::Date(date));
    }
    Some(ParsedDate::DateTime(date.and_hms_opt(hour, minute, second)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, milli)
            .unwrap()
    }

    #[test]
    fn test_iso_literal_with_zero_time_is_a_date() {
        assert_eq!(
            parse_wire_date("2001-01-01T00:00:00", false),
            Some(ParsedDate::Date(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()))
        );
    }

    #[test]
    fn test_iso_literal_with_nonzero_time_is_a_datetime() {
        assert_eq!(
            parse_wire_date("2013-01-01T09:30:05", false),
            Some(ParsedDate::DateTime(dt(2013, 1, 1, 9, 30, 5, 0)))
        );
    }

    #[test]
    fn test_force_datetime_promotes_midnight() {
        assert_eq!(
            parse_wire_date("2001-01-01T00:00:00", true),
            Some(ParsedDate::DateTime(dt(2001, 1, 1, 0, 0, 0, 0)))
        );
    }

    #[test]
    fn test_epoch_millis() {
        assert_eq!(
            parse_wire_date("/Date(1376543055997)/", false),
            Some(ParsedDate::DateTime(dt(2013, 8, 15, 5, 4, 15, 997)))
        );
    }

    #[test]
    fn test_epoch_millis_positive_offset() {
        assert_eq!(
            parse_wire_date("/Date(1376543055997+1200)/", false),
            Some(ParsedDate::DateTime(dt(2013, 8, 15, 17, 4, 15, 997)))
        );
    }

    #[test]
    fn test_epoch_millis_negative_offset() {
        assert_eq!(
            parse_wire_date("/Date(1376543055997-0300)/", false),
            Some(ParsedDate::DateTime(dt(2013, 8, 15, 2, 4, 15, 997)))
        );
    }

    #[test]
    fn test_zero_offset_is_accepted() {
        assert_eq!(
            parse_wire_date("/Date(1376543055997+0000)/", false),
            Some(ParsedDate::DateTime(dt(2013, 8, 15, 5, 4, 15, 997)))
        );
    }

    #[test]
    fn test_negative_offset_minutes_carry_the_sign() {
        // -0330 shifts back three and a half hours, not -3h +30m.
        assert_eq!(
            parse_wire_date("/Date(1376543055997-0330)/", false),
            Some(ParsedDate::DateTime(dt(2013, 8, 15, 1, 34, 15, 997)))
        );
    }

    #[test]
    fn test_only_exact_matches() {
        assert_eq!(parse_wire_date(" 2001-01-01T00:30:00", false), None);
        assert_eq!(parse_wire_date("2001-01-01T00:30:00 ", false), None);
        assert_eq!(parse_wire_date("2001-01-01T00:30:00Z", false), None);
        assert_eq!(parse_wire_date("2001-01-01 00:30:00", false), None);
        assert_eq!(parse_wire_date("2001-01-01T00:30", false), None);
    }

    #[test]
    fn test_invalid_calendar_date_is_no_match() {
        assert_eq!(parse_wire_date("2013-00-10T00:00:00", false), None);
        assert_eq!(parse_wire_date("2013-02-30T00:00:00", false), None);
    }
}
