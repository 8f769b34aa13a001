//! Recurrence rule evaluation for repeating tasks.
//!
//! A rule string is a whitespace-separated tag plus parameters:
//! `d <interval>`, `w <weekday,...>`, `m <day,...> [month,...]`, or `y`.
//! [`next_occurrence`] computes the first date matching the rule that lies
//! strictly after a reference date.

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

/// Canonical on-the-wire date representation (`YYYYMMDD`).
pub const DATE_FORMAT: &str = "%Y%m%d";

const MAX_DAILY_INTERVAL: i64 = 400;
const SUNDAY: i64 = 7;
const MIN_MONTH_DAY: i64 = -2;
const MAX_MONTH_DAY: i64 = 31;

/// Upper bound for day-by-day scans, counted past the later of the reference
/// date and the task date. A rule with no match inside this window
/// (e.g. `m 31 2`) is unsatisfiable.
const MAX_SCAN_DAYS: u64 = 5 * 366;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepeatError {
    #[error("repeat rule is required")]
    EmptyRule,

    #[error("unknown repeat tag {0:?}")]
    UnknownTag(String),

    #[error("missing parameter for repeat tag {0:?}")]
    MissingParameter(char),

    #[error("invalid repeat parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid date {0:?}, expected YYYYMMDD")]
    InvalidDate(String),

    #[error("repeat rule {0:?} has no occurrence within {MAX_SCAN_DAYS} days")]
    Unsatisfiable(String),
}

pub type RepeatResult<T> = std::result::Result<T, RepeatError>;

/// ## Summary
/// Computes the next occurrence of a repeating task.
///
/// `date` is the task's current due date in `YYYYMMDD` form; the result is
/// the first date matching `repeat` that is strictly after `now`, in the
/// same form.
///
/// ## Errors
/// Returns an error if `date` does not parse, if the rule is empty or
/// malformed, or if the rule cannot match any date near `now`.
pub fn next_occurrence(now: NaiveDate, date: &str, repeat: &str) -> RepeatResult<String> {
    if repeat.is_empty() {
        return Err(RepeatError::EmptyRule);
    }

    let start = parse_date(date)?;
    let rule: Rule = repeat.parse()?;

    Ok(format_date(rule.next_after(now, start)?))
}

/// ## Summary
/// Parses a canonical `YYYYMMDD` date string.
///
/// ## Errors
/// Returns `RepeatError::InvalidDate` if the string is not a valid calendar
/// day in that format.
pub fn parse_date(raw: &str) -> RepeatResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| RepeatError::InvalidDate(raw.to_string()))
}

/// Formats a date in the canonical `YYYYMMDD` form.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Every `interval` days.
    Daily { interval: u64 },
    /// On the listed weekdays, numbered with Sunday as 0.
    Weekly { weekdays: Vec<u32> },
    /// On the listed days of month (negative values count from the month
    /// end), optionally restricted to the listed months.
    Monthly { days: Vec<i64>, months: Vec<i64> },
    /// Every year, same month and day.
    Yearly,
}

impl std::str::FromStr for Rule {
    type Err = RepeatError;

    fn from_str(s: &str) -> RepeatResult<Self> {
        if s.is_empty() {
            return Err(RepeatError::EmptyRule);
        }

        // Single-space separation; a doubled space yields an empty chunk
        // that fails integer parsing.
        let mut chunks = s.split(' ');
        let tag = chunks.next().unwrap_or_default();

        match tag {
            "d" => {
                let raw = chunks.next().ok_or(RepeatError::MissingParameter('d'))?;
                let interval = parse_number(raw)?;
                if !(1..=MAX_DAILY_INTERVAL).contains(&interval) {
                    return Err(RepeatError::InvalidParameter(format!(
                        "daily interval must be between 1 and {MAX_DAILY_INTERVAL}, got {interval}"
                    )));
                }
                let interval = u64::try_from(interval).map_err(|_| {
                    RepeatError::InvalidParameter(format!("daily interval {interval}"))
                })?;
                Ok(Self::Daily { interval })
            }
            "w" => {
                let raw = chunks.next().ok_or(RepeatError::MissingParameter('w'))?;
                let weekdays = parse_number_list(raw)?
                    .into_iter()
                    .map(parse_weekday)
                    .collect::<RepeatResult<Vec<_>>>()?;
                Ok(Self::Weekly { weekdays })
            }
            "m" => {
                let raw = chunks.next().ok_or(RepeatError::MissingParameter('m'))?;
                let days = parse_number_list(raw)?;
                for &day in &days {
                    if day == 0 || day > MAX_MONTH_DAY || day < MIN_MONTH_DAY {
                        return Err(RepeatError::InvalidParameter(format!(
                            "month day must be between {MIN_MONTH_DAY} and {MAX_MONTH_DAY} and not 0, got {day}"
                        )));
                    }
                }
                // Month numbers are taken as-is; an impossible month never
                // matches and trips the scan bound instead.
                let months = match chunks.next() {
                    Some(raw) => parse_number_list(raw)?,
                    None => Vec::new(),
                };
                Ok(Self::Monthly { days, months })
            }
            "y" => Ok(Self::Yearly),
            other => Err(RepeatError::UnknownTag(other.to_string())),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily { interval } => write!(f, "d {interval}"),
            Self::Weekly { weekdays } => {
                let days = weekdays
                    .iter()
                    .map(|d| if *d == 0 { SUNDAY.to_string() } else { d.to_string() })
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "w {days}")
            }
            Self::Monthly { days, months } => {
                write!(f, "m {}", join_numbers(days))?;
                if !months.is_empty() {
                    write!(f, " {}", join_numbers(months))?;
                }
                Ok(())
            }
            Self::Yearly => f.write_str("y"),
        }
    }
}

impl Rule {
    /// ## Summary
    /// Returns the first date matching the rule that is strictly after `now`.
    ///
    /// Daily and yearly rules step from `start` and always advance at least
    /// once; weekly and monthly rules scan day by day beginning with `start`
    /// itself, so an unadvanced start date that already qualifies is returned
    /// as-is.
    ///
    /// ## Errors
    /// Returns `RepeatError::Unsatisfiable` if a weekly or monthly scan finds
    /// no match within the bounded window past `now`.
    pub fn next_after(&self, now: NaiveDate, start: NaiveDate) -> RepeatResult<NaiveDate> {
        match self {
            Self::Daily { interval } => {
                Ok(advance_past(now, start, |d| d + Days::new(*interval)))
            }
            Self::Yearly => Ok(advance_past(now, start, next_anniversary)),
            Self::Weekly { weekdays } => self.scan_days(now, start, |d| {
                weekdays.contains(&d.weekday().num_days_from_sunday())
            }),
            Self::Monthly { days, months } => {
                self.scan_days(now, start, |d| matches_month_day(d, days, months))
            }
        }
    }

    /// Walks forward one day at a time until a day after `now` matches.
    /// Bounded so that a logically empty rule fails instead of spinning.
    fn scan_days(
        &self,
        now: NaiveDate,
        start: NaiveDate,
        matches: impl Fn(NaiveDate) -> bool,
    ) -> RepeatResult<NaiveDate> {
        let horizon = start.max(now) + Days::new(MAX_SCAN_DAYS);
        let mut date = start;
        while date <= horizon {
            if date > now && matches(date) {
                return Ok(date);
            }
            date = date + Days::new(1);
        }
        Err(RepeatError::Unsatisfiable(self.to_string()))
    }
}

/// Applies `step` until the result lands after `now`. The step is applied at
/// least once, even when `start` is already past `now`.
fn advance_past(
    now: NaiveDate,
    start: NaiveDate,
    step: impl Fn(NaiveDate) -> NaiveDate,
) -> NaiveDate {
    let mut date = start;
    loop {
        date = step(date);
        if date > now {
            return date;
        }
    }
}

/// Same month and day one year later; Feb 29 on a non-leap target rolls over
/// to Mar 1, matching standard calendar normalization.
fn next_anniversary(date: NaiveDate) -> NaiveDate {
    let year = date.year() + 1;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date)
}

/// Month filter is checked before any day selector; a negative selector `d`
/// matches the day equal to `last_day + d + 1`.
fn matches_month_day(date: NaiveDate, days: &[i64], months: &[i64]) -> bool {
    if !months.is_empty() && !months.contains(&i64::from(date.month())) {
        return false;
    }

    let day = i64::from(date.day());
    let last = last_day_of_month(date);
    days.iter()
        .any(|&sel| if sel > 0 { sel == day } else { last + sel + 1 == day })
}

fn last_day_of_month(date: NaiveDate) -> i64 {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };

    first_of_next
        .and_then(|d| d.pred_opt())
        .map_or(MAX_MONTH_DAY, |d| i64::from(d.day()))
}

fn parse_weekday(day: i64) -> RepeatResult<u32> {
    if !(1..=SUNDAY).contains(&day) {
        return Err(RepeatError::InvalidParameter(format!(
            "weekday must be between 1 and {SUNDAY}, got {day}"
        )));
    }
    // 7 means Sunday, which chrono numbers as 0.
    let day = if day == SUNDAY { 0 } else { day };
    u32::try_from(day).map_err(|_| RepeatError::InvalidParameter(format!("weekday {day}")))
}

fn parse_number(token: &str) -> RepeatResult<i64> {
    token
        .parse()
        .map_err(|_| RepeatError::InvalidParameter(format!("not a number: {token:?}")))
}

fn parse_number_list(raw: &str) -> RepeatResult<Vec<i64>> {
    raw.split(',').map(parse_number).collect()
}

fn join_numbers(values: &[i64]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
