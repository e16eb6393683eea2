//! Calendar-day utilities.
//!
//! Every day-level comparison in taskview works on a timezone-free calendar
//! day ([`NaiveDate`]) or its canonical storage string (`YYYY-MM-DD`). Moments
//! observed in a local timezone are reduced to their local calendar day first,
//! so a task stored as due "2025-03-10" is due on March 10th no matter how far
//! the observer's offset is from UTC.
//!
//! For callers that need an instant rather than a day, [`to_utc_anchor`] and
//! [`anchor_for`] produce a UTC midnight whose year/month/day equal the local
//! calendar day.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Canonical storage format for calendar days.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Naive date-time layouts accepted by the parser, tried in order.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Offset-bearing layouts that RFC 3339 parsing does not cover.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Returns a UTC instant at 00:00 whose year/month/day equal the calendar day
/// of `moment` in its own timezone.
pub fn to_utc_anchor<Tz: TimeZone>(moment: &DateTime<Tz>) -> DateTime<Utc> {
    anchor_for(moment.date_naive())
}

/// Returns the UTC midnight anchor for a calendar day.
pub fn anchor_for(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Returns the calendar day encoded by a UTC anchor.
pub fn calendar_date(anchor: &DateTime<Utc>) -> NaiveDate {
    anchor.date_naive()
}

/// Formats a calendar day as `YYYY-MM-DD`.
pub fn format_date_for_storage(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}

/// Formats a UTC anchor as `YYYY-MM-DD` using its UTC fields.
pub fn format_anchor_for_storage(anchor: &DateTime<Utc>) -> String {
    format_date_for_storage(calendar_date(anchor))
}

/// Returns today's calendar day in the system timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Returns today's calendar day in the given timezone.
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Shifts a calendar day by `days` (negative values go back in time).
///
/// Saturates at the representable range instead of panicking.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Parses a date or date-time string into its calendar day in the system
/// timezone. See [`parse_calendar_date_in`].
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    parse_calendar_date_in(input, &Local)
}

/// Parses a date or date-time string into a calendar day.
///
/// Accepted shapes:
/// - `2025-03-10`, `2025/03/10`
/// - `2025-03-10T14:30`, `2025-03-10T14:30:00`, `2025-03-10 14:30`
/// - `2025-03-10T14:30:00Z`, `2025-03-10T14:30:00+02:00`
///
/// Values carrying an offset are converted into `tz` before the day is taken.
/// Naive date-times keep the day they were written with. Impossible dates
/// (month 13, February 30th) yield `None`.
pub fn parse_calendar_date_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace('/', "-");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(tz).date_naive());
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(tz).date_naive());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(&normalized, STORAGE_FORMAT).ok()
}

/// Parses any accepted date shape and re-formats it as `YYYY-MM-DD`.
pub fn normalize_date_string(input: &str) -> Option<String> {
    parse_calendar_date(input).map(format_date_for_storage)
}

/// Returns the date portion of a date or date-time string without validating it.
pub fn date_part(input: &str) -> &str {
    let trimmed = input.trim();
    match trimmed.find(|c: char| c == 'T' || c == ' ') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    }
}

/// Returns true if the string carries a time-of-day component.
pub fn has_time_component(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.len() > 10 && trimmed.find(|c: char| c == 'T' || c == ' ').is_some_and(|idx| idx >= 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use chrono_tz::{America::Los_Angeles, Asia::Tokyo, Pacific::Kiritimati};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ==================== Anchoring ====================

    #[test]
    fn test_anchor_keeps_local_day_west_of_utc() {
        // 23:30 in Los Angeles is already the next day in UTC.
        let moment = Los_Angeles.with_ymd_and_hms(2025, 3, 10, 23, 30, 0).unwrap();
        let anchor = to_utc_anchor(&moment);

        assert_eq!(anchor.year(), 2025);
        assert_eq!(anchor.month(), 3);
        assert_eq!(anchor.day(), 10);
        assert_eq!(anchor.hour(), 0);
        assert_eq!(format_anchor_for_storage(&anchor), "2025-03-10");
    }

    #[test]
    fn test_anchor_keeps_local_day_east_of_utc() {
        // 00:30 in Tokyo is still the previous day in UTC.
        let moment = Tokyo.with_ymd_and_hms(2025, 3, 10, 0, 30, 0).unwrap();
        let anchor = to_utc_anchor(&moment);
        assert_eq!(format_anchor_for_storage(&anchor), "2025-03-10");
    }

    #[test]
    fn test_anchor_extreme_offset() {
        // UTC+14
        let moment = Kiritimati.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        assert_eq!(format_anchor_for_storage(&to_utc_anchor(&moment)), "2025-01-01");
    }

    #[test]
    fn test_anchor_for_roundtrips_calendar_date() {
        let date = ymd(2024, 2, 29);
        let anchor = anchor_for(date);
        assert_eq!(calendar_date(&anchor), date);
        assert_eq!(anchor.hour(), 0);
        assert_eq!(anchor.minute(), 0);
    }

    // ==================== Formatting ====================

    #[test]
    fn test_format_zero_pads() {
        assert_eq!(format_date_for_storage(ymd(2025, 1, 5)), "2025-01-05");
        assert_eq!(format_date_for_storage(ymd(2025, 11, 30)), "2025-11-30");
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_calendar_date_in("2025-03-10", &Utc), Some(ymd(2025, 3, 10)));
    }

    #[test]
    fn test_parse_slash_separated_date() {
        assert_eq!(parse_calendar_date_in("2025/03/10", &Utc), Some(ymd(2025, 3, 10)));
    }

    #[test]
    fn test_parse_naive_datetimes_keep_written_day() {
        for input in [
            "2025-03-10T23:45",
            "2025-03-10T23:45:10",
            "2025-03-10T23:45:10.250",
            "2025-03-10 23:45",
            "2025-03-10 23:45:10",
            "2025/03/10 23:45",
        ] {
            assert_eq!(
                parse_calendar_date_in(input, &Tokyo),
                Some(ymd(2025, 3, 10)),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_parse_offset_datetime_converts_to_timezone() {
        // 2025-03-10 03:00 UTC is still March 9th in Los Angeles.
        assert_eq!(
            parse_calendar_date_in("2025-03-10T03:00:00Z", &Los_Angeles),
            Some(ymd(2025, 3, 9))
        );
        assert_eq!(
            parse_calendar_date_in("2025-03-10T03:00:00Z", &Tokyo),
            Some(ymd(2025, 3, 10))
        );
        assert_eq!(
            parse_calendar_date_in("2025-03-10T20:00+00:00", &Tokyo),
            Some(ymd(2025, 3, 11))
        );
    }

    #[test]
    fn test_parse_rejects_invalid_calendar_dates() {
        assert_eq!(parse_calendar_date_in("2025-13-01", &Utc), None);
        assert_eq!(parse_calendar_date_in("2025-02-30", &Utc), None);
        assert_eq!(parse_calendar_date_in("2023-02-29", &Utc), None);
        assert_eq!(parse_calendar_date_in("2025-02-30T10:00", &Utc), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_calendar_date_in("", &Utc), None);
        assert_eq!(parse_calendar_date_in("   ", &Utc), None);
        assert_eq!(parse_calendar_date_in("tomorrow", &Utc), None);
        assert_eq!(parse_calendar_date_in("2025-03", &Utc), None);
    }

    #[test]
    fn test_parse_accepts_leap_day() {
        assert_eq!(parse_calendar_date_in("2024-02-29", &Utc), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_normalize_date_string() {
        assert_eq!(normalize_date_string("2025/3/7").as_deref(), Some("2025-03-07"));
        assert_eq!(normalize_date_string("2025-03-07T10:00").as_deref(), Some("2025-03-07"));
        assert_eq!(normalize_date_string("nope"), None);
    }

    // ==================== Helpers ====================

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2025-03-10"), "2025-03-10");
        assert_eq!(date_part("2025-03-10T10:00"), "2025-03-10");
        assert_eq!(date_part("2025-03-10 10:00"), "2025-03-10");
    }

    #[test]
    fn test_has_time_component() {
        assert!(!has_time_component("2025-03-10"));
        assert!(has_time_component("2025-03-10T10:00"));
        assert!(has_time_component("2025-03-10 10:00"));
    }

    #[test]
    fn test_add_days_crosses_month_and_year() {
        assert_eq!(add_days(ymd(2024, 12, 31), 1), ymd(2025, 1, 1));
        assert_eq!(add_days(ymd(2025, 3, 1), -1), ymd(2025, 2, 28));
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
        assert_eq!(add_days(ymd(2025, 3, 10), i64::MAX), NaiveDate::MAX);
        assert_eq!(add_days(ymd(2025, 3, 10), i64::MIN), NaiveDate::MIN);
        assert_eq!(add_days(ymd(2025, 3, 10), 999_999_999_999_999), NaiveDate::MAX);
    }

    #[test]
    fn test_today_in_matches_utc_now_for_utc() {
        let before = Utc::now().date_naive();
        let today = today_in(&Utc);
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }
}
