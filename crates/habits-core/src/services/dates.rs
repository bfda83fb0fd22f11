//! Calendar-day normalization
//!
//! Every progress record and every evaluation is keyed by a local calendar
//! day. Whatever the caller hands us (a `YYYY-MM-DD` string, a timestamp, a
//! date, or nothing at all) ends up as a `NaiveDate` in local time, and that
//! value is the only thing ever compared.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

use crate::error::{Error, Result};

/// Anything that can be turned into a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayInput<'a> {
    /// Today, local time
    Today,
    /// `YYYY-MM-DD` text (or the keyword `today`)
    Text(&'a str),
    /// An already-normalized day
    Day(NaiveDate),
    /// An instant, truncated to its local calendar day
    Instant(DateTime<Local>),
}

impl<'a> DayInput<'a> {
    pub fn resolve(self) -> Result<NaiveDate> {
        match self {
            DayInput::Today => Ok(today()),
            DayInput::Text(s) => parse_day(s),
            DayInput::Day(d) => Ok(d),
            DayInput::Instant(dt) => Ok(dt.date_naive()),
        }
    }
}

impl<'a> From<&'a str> for DayInput<'a> {
    fn from(s: &'a str) -> Self {
        DayInput::Text(s)
    }
}

impl<'a> From<Option<&'a str>> for DayInput<'a> {
    fn from(s: Option<&'a str>) -> Self {
        match s.map(str::trim) {
            Some(s) if !s.is_empty() => DayInput::Text(s),
            _ => DayInput::Today,
        }
    }
}

impl From<NaiveDate> for DayInput<'_> {
    fn from(d: NaiveDate) -> Self {
        DayInput::Day(d)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DayInput<'_> {
    fn from(dt: DateTime<Tz>) -> Self {
        DayInput::Instant(dt.with_timezone(&Local))
    }
}

/// Normalize any supported input to a local calendar day
pub fn normalize_day<'a>(input: impl Into<DayInput<'a>>) -> Result<NaiveDate> {
    input.into().resolve()
}

/// Today's local calendar day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `YYYY-MM-DD` by its components.
///
/// The string is split on `-` and year/month/day are built explicitly rather
/// than going through a generic timestamp parser, so no timezone shift can
/// move the result to a neighbouring day.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("today") {
        return Ok(today());
    }

    let invalid = || Error::validation(format!("Invalid date format: {}. Use YYYY-MM-DD", s));

    let mut parts = s.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    let day: u32 = d.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Format a day as `YYYY-MM-DD`
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier)
pub fn day_offset(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Day-of-week index, 0 = Sunday .. 6 = Saturday
pub fn weekday_index(day: NaiveDate) -> u32 {
    day.weekday().num_days_from_sunday()
}

/// Short English name for a weekday index (0 = Sunday)
pub fn weekday_label(index: u32) -> &'static str {
    match index {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "?",
    }
}

/// First day of a `num_days` window that ends on `end` (inclusive)
pub fn window_start(end: NaiveDate, num_days: u32) -> NaiveDate {
    end - Duration::days(i64::from(num_days.max(1)) - 1)
}

/// `num_days` consecutive days starting at `start`, ascending
pub fn days_from(start: NaiveDate, num_days: u32) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(num_days as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_components() {
        assert_eq!(parse_day("2024-01-05").unwrap(), ymd(2024, 1, 5));
        assert_eq!(parse_day(" 2024-1-5 ").unwrap(), ymd(2024, 1, 5));
        assert_eq!(parse_day("2024-02-29").unwrap(), ymd(2024, 2, 29));
    }

    #[test]
    fn test_parse_day_today_keyword() {
        assert_eq!(parse_day("today").unwrap(), today());
    }

    #[test]
    fn test_parse_day_invalid() {
        for bad in ["", "2024/01/05", "2024-13-01", "2023-02-29", "01-05", "2024-01-05-01", "2024-01-05T10:00", "abcd-ef-gh"] {
            let err = parse_day(bad).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_parse_day_error_message() {
        let err = parse_day("bad-date").unwrap_err();
        assert!(err.to_string().contains("bad-date"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_normalize_missing_is_today() {
        assert_eq!(normalize_day(None::<&str>).unwrap(), today());
        assert_eq!(normalize_day(Some("  ")).unwrap(), today());
        assert_eq!(normalize_day(DayInput::Today).unwrap(), today());
    }

    #[test]
    fn test_normalize_instant_and_string_agree() {
        let instant = Local.with_ymd_and_hms(2024, 3, 10, 18, 45, 12).unwrap();
        let from_instant = normalize_day(instant).unwrap();
        let from_text = normalize_day(format_day(from_instant).as_str()).unwrap();
        assert_eq!(from_instant, from_text);
        assert_eq!(from_instant, ymd(2024, 3, 10));

        // Same instant expressed in UTC still lands on the local day
        let utc = instant.with_timezone(&Utc);
        assert_eq!(normalize_day(utc).unwrap(), ymd(2024, 3, 10));
    }

    #[test]
    fn test_day_offset_is_calendar_days() {
        assert_eq!(day_offset(ymd(2024, 1, 1), ymd(2024, 1, 4)), 3);
        assert_eq!(day_offset(ymd(2024, 1, 4), ymd(2024, 1, 1)), -3);
        // Spans a DST change in most zones
        assert_eq!(day_offset(ymd(2024, 3, 1), ymd(2024, 4, 1)), 31);
        assert_eq!(day_offset(ymd(2024, 10, 20), ymd(2024, 11, 10)), 21);
    }

    #[test]
    fn test_weekday_index_sunday_first() {
        assert_eq!(weekday_index(ymd(2024, 1, 7)), 0); // Sunday
        assert_eq!(weekday_index(ymd(2024, 1, 8)), 1); // Monday
        assert_eq!(weekday_index(ymd(2024, 1, 13)), 6); // Saturday
        assert_eq!(weekday_label(3), "Wed");
    }

    #[test]
    fn test_window_and_days_from() {
        let end = ymd(2024, 1, 5);
        let start = window_start(end, 5);
        assert_eq!(start, ymd(2024, 1, 1));
        let days: Vec<_> = days_from(start, 5).collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days.first(), Some(&ymd(2024, 1, 1)));
        assert_eq!(days.last(), Some(&end));

        assert_eq!(window_start(end, 1), end);
        assert_eq!(window_start(end, 0), end);
        assert_eq!(days_from(start, 0).count(), 0);
    }
}
