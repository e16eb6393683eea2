//! A day-level subset of iCalendar recurrence rules.
//!
//! Supported: `FREQ` (DAILY, WEEKLY, MONTHLY, YEARLY), `INTERVAL`, `BYDAY`
//! (with ordinals such as `2TU` or `-1FR` for monthly and yearly rules),
//! `BYMONTHDAY` (negative values count back from the month end), `BYMONTH`,
//! `BYSETPOS`, `COUNT` and `UNTIL`, optionally preceded by a
//! `DTSTART:YYYYMMDD[THHMMSS[Z]]` part on its own line or separated by `;`.
//! Time-of-day parts (`BYHOUR`, `BYMINUTE`, `BYSECOND`) and `WKST` are
//! accepted and ignored; weeks always start on Monday.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use taskview_model::date::add_days;

use super::error::{RecurrenceError, RecurrenceResult};

/// How far ahead occurrence searches look before giving up.
pub const SEARCH_HORIZON_DAYS: i64 = 366 * 8;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A `BYDAY` entry: weekday with an optional ordinal (`-1FR` = last Friday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySpec {
    pub ordinal: Option<i32>,
    pub weekday: Weekday,
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub by_day: Vec<WeekdaySpec>,
    pub by_month_day: Vec<i32>,
    pub by_month: Vec<u32>,
    pub by_set_pos: Vec<i32>,
    pub count: Option<u32>,
    pub until: Option<NaiveDate>,
    /// Series start embedded in the rule, if any.
    pub dtstart: Option<NaiveDate>,
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(input: &str) -> RecurrenceResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RecurrenceError::EmptyRule);
        }

        let mut frequency = None;
        let mut rule = RecurrenceRule {
            frequency: Frequency::Daily,
            interval: 1,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            by_set_pos: Vec::new(),
            count: None,
            until: None,
            dtstart: None,
        };

        for line in trimmed.lines() {
            let line = line.trim().to_ascii_uppercase();
            if line.is_empty() || line.starts_with("EXDATE") || line.starts_with("RDATE") {
                continue;
            }

            let mut parts = line
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .peekable();

            while let Some(part) = parts.next() {
                if let Some(rest) = part.strip_prefix("DTSTART") {
                    // `DTSTART:20250101` or `DTSTART;TZID=Europe/Paris:20250101T090000`
                    let value = match rest.rsplit_once(':') {
                        Some((_, value)) => value,
                        None => parts
                            .next()
                            .and_then(|p| p.rsplit_once(':'))
                            .map(|(_, value)| value)
                            .ok_or_else(|| RecurrenceError::invalid_value("DTSTART", rest))?,
                    };
                    rule.dtstart = Some(parse_rule_date("DTSTART", value)?);
                    continue;
                }

                let part = part.strip_prefix("RRULE:").unwrap_or(part);
                let (key, value) = part
                    .split_once('=')
                    .ok_or_else(|| RecurrenceError::invalid_part(part))?;

                match key {
                    "FREQ" => frequency = Some(parse_frequency(value)?),
                    "INTERVAL" => rule.interval = parse_positive(key, value)?,
                    "COUNT" => rule.count = Some(parse_positive(key, value)?),
                    "UNTIL" => rule.until = Some(parse_rule_date(key, value)?),
                    "BYDAY" => {
                        rule.by_day = value
                            .split(',')
                            .map(parse_weekday_spec)
                            .collect::<RecurrenceResult<_>>()?;
                    }
                    "BYMONTHDAY" => {
                        rule.by_month_day = parse_int_list(key, value, |n| n != 0 && n.abs() <= 31)?;
                    }
                    "BYMONTH" => {
                        rule.by_month = parse_int_list(key, value, |n| (1..=12).contains(&n))?
                            .into_iter()
                            .map(|n| n.unsigned_abs())
                            .collect();
                    }
                    "BYSETPOS" => {
                        rule.by_set_pos = parse_int_list(key, value, |n| n != 0 && n.abs() <= 366)?;
                    }
                    "WKST" | "BYHOUR" | "BYMINUTE" | "BYSECOND" => {}
                    other => return Err(RecurrenceError::unsupported_part(other)),
                }
            }
        }

        rule.frequency = frequency.ok_or(RecurrenceError::MissingFrequency)?;
        Ok(rule)
    }
}

fn parse_frequency(value: &str) -> RecurrenceResult<Frequency> {
    match value {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        other => Err(RecurrenceError::invalid_value("FREQ", other)),
    }
}

fn parse_positive(key: &str, value: &str) -> RecurrenceResult<u32> {
    value
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| RecurrenceError::invalid_value(key, value))
}

fn parse_int_list(key: &str, value: &str, valid: impl Fn(i32) -> bool) -> RecurrenceResult<Vec<i32>> {
    value
        .split(',')
        .map(|raw| {
            raw.trim()
                .trim_start_matches('+')
                .parse::<i32>()
                .ok()
                .filter(|n| valid(*n))
                .ok_or_else(|| RecurrenceError::invalid_value(key, raw))
        })
        .collect()
}

/// Parses `YYYYMMDD`, `YYYYMMDDTHHMMSS[Z]` or `YYYY-MM-DD` into a day.
fn parse_rule_date(key: &str, value: &str) -> RecurrenceResult<NaiveDate> {
    let compact = value.get(..8).unwrap_or(value);
    NaiveDate::parse_from_str(compact, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| RecurrenceError::invalid_value(key, value))
}

fn parse_weekday_spec(raw: &str) -> RecurrenceResult<WeekdaySpec> {
    let raw = raw.trim();
    let invalid = || RecurrenceError::invalid_value("BYDAY", raw);
    if raw.len() < 2 || !raw.is_char_boundary(raw.len() - 2) {
        return Err(invalid());
    }
    let (prefix, code) = raw.split_at(raw.len() - 2);
    let weekday = match code {
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        "SU" => Weekday::Sun,
        _ => return Err(invalid()),
    };
    let ordinal = if prefix.is_empty() {
        None
    } else {
        let n = prefix
            .trim_start_matches('+')
            .parse::<i32>()
            .map_err(|_| invalid())?;
        if n == 0 || n.abs() > 53 {
            return Err(invalid());
        }
        Some(n)
    };
    Ok(WeekdaySpec { ordinal, weekday })
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn month_day_matches(month_day: i32, date: NaiveDate) -> bool {
    let day = date.day() as i32;
    if month_day > 0 {
        day == month_day
    } else {
        let dim = days_in_month(date.year(), date.month()) as i32;
        day == dim + month_day + 1
    }
}

impl RecurrenceRule {
    /// Parses a rule string.
    pub fn parse(input: &str) -> RecurrenceResult<Self> {
        input.parse()
    }

    /// Returns true if `date` falls in an active period (every `interval`
    /// days/weeks/months/years counted from `start`).
    fn in_period(&self, start: NaiveDate, date: NaiveDate) -> bool {
        let interval = i64::from(self.interval.max(1));
        let steps = match self.frequency {
            Frequency::Daily => (date - start).num_days(),
            Frequency::Weekly => (week_start(date) - week_start(start)).num_days() / 7,
            Frequency::Monthly => month_index(date) - month_index(start),
            Frequency::Yearly => i64::from(date.year() - start.year()),
        };
        steps >= 0 && steps % interval == 0
    }

    fn weekday_matches(&self, spec: &WeekdaySpec, date: NaiveDate) -> bool {
        if date.weekday() != spec.weekday {
            return false;
        }
        let Some(n) = spec.ordinal else {
            return true;
        };
        let month_scope = match self.frequency {
            Frequency::Monthly => true,
            Frequency::Yearly => !self.by_month.is_empty(),
            Frequency::Daily | Frequency::Weekly => return true,
        };
        let (position, length) = if month_scope {
            (date.day(), days_in_month(date.year(), date.month()))
        } else {
            (date.ordinal(), days_in_year(date.year()))
        };
        let nth = if n > 0 {
            (position - 1) / 7 + 1
        } else {
            (length - position) / 7 + 1
        };
        nth as i32 == n.abs()
    }

    /// Applies the `BY*` filters and the parts implied by the series start.
    fn matches_filters(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if !self.by_month.is_empty() && !self.by_month.contains(&date.month()) {
            return false;
        }
        if !self.by_month_day.is_empty()
            && !self.by_month_day.iter().any(|d| month_day_matches(*d, date))
        {
            return false;
        }
        if !self.by_day.is_empty() && !self.by_day.iter().any(|s| self.weekday_matches(s, date)) {
            return false;
        }

        let explicit_day = !self.by_day.is_empty() || !self.by_month_day.is_empty();
        match self.frequency {
            Frequency::Daily => true,
            Frequency::Weekly => explicit_day || date.weekday() == start.weekday(),
            Frequency::Monthly => explicit_day || date.day() == start.day(),
            Frequency::Yearly => {
                explicit_day
                    || ((!self.by_month.is_empty() || date.month() == start.month())
                        && date.day() == start.day())
            }
        }
    }

    /// Days of the period `date` belongs to, for `BYSETPOS` selection.
    fn period_days(&self, date: NaiveDate) -> Vec<NaiveDate> {
        let (first, len) = match self.frequency {
            Frequency::Daily => (date, 1),
            Frequency::Weekly => (week_start(date), 7),
            Frequency::Monthly => (
                date.with_day(1).unwrap_or(date),
                days_in_month(date.year(), date.month()),
            ),
            Frequency::Yearly => (
                date.with_ordinal(1).unwrap_or(date),
                days_in_year(date.year()),
            ),
        };
        first.iter_days().take(len as usize).collect()
    }

    fn set_pos_matches(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if self.by_set_pos.is_empty() {
            return true;
        }
        let candidates: Vec<NaiveDate> = self
            .period_days(date)
            .into_iter()
            .filter(|d| self.matches_filters(start, *d))
            .collect();
        let Some(index) = candidates.iter().position(|d| *d == date) else {
            return false;
        };
        let len = candidates.len() as i32;
        let index = index as i32;
        self.by_set_pos
            .iter()
            .any(|pos| if *pos > 0 { index == pos - 1 } else { index == len + pos })
    }

    /// Returns true if the pattern produces `date`, ignoring `COUNT`.
    fn matches_pattern(&self, start: NaiveDate, date: NaiveDate) -> bool {
        date >= start
            && self.until.map_or(true, |until| date <= until)
            && self.in_period(start, date)
            && self.matches_filters(start, date)
            && self.set_pos_matches(start, date)
    }

    /// Returns true if the series starting on `start` has an instance on `date`.
    pub fn occurs_on(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if !self.matches_pattern(start, date) {
            return false;
        }
        match self.count {
            None => true,
            Some(count) => {
                let ordinal = start
                    .iter_days()
                    .take_while(|d| *d <= date)
                    .filter(|d| self.matches_pattern(start, *d))
                    .count();
                ordinal <= count as usize
            }
        }
    }

    /// Returns the first instance on or after `from`, looking at most
    /// [`SEARCH_HORIZON_DAYS`] ahead.
    pub fn next_on_or_after(&self, start: NaiveDate, from: NaiveDate) -> Option<NaiveDate> {
        let begin = from.max(start);
        let mut seen = match self.count {
            Some(_) => start
                .iter_days()
                .take_while(|d| *d < begin)
                .filter(|d| self.matches_pattern(start, *d))
                .count(),
            None => 0,
        };
        let end = add_days(begin, SEARCH_HORIZON_DAYS);

        for day in begin.iter_days().take_while(|d| *d <= end) {
            if self.until.is_some_and(|until| day > until) {
                return None;
            }
            if self.matches_pattern(start, day) {
                seen += 1;
                if self.count.is_some_and(|count| seen > count as usize) {
                    return None;
                }
                return Some(day);
            }
        }
        None
    }
}
