//! The month-long measurement window.
//!
//! A [`TimeWindow`] is the half-open interval `[start, end)` covering one
//! calendar month in the run's local timezone. It is built once per run from
//! the `--month` token and never changes afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Month, Months, NaiveDate};
use chrono_tz::Tz;
use regex::Regex;

use crate::error::{MttrError, Result};
use crate::time_utils::localize;

/// Half-open interval `[start, end)` spanning exactly one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    /// Build the window for the month named by `token`, in timezone `tz`.
    ///
    /// Accepts `2018-08`, `2018/08`, `2018.8`, `08/2018`, `08-2018`,
    /// `Aug 2018`, `August 2018`, `2018 Aug` and full dates such as
    /// `2018-08-15`, which select the month they fall in.
    pub fn from_month(token: &str, tz: Tz) -> Result<Self> {
        let first = parse_month_token(token)
            .ok_or_else(|| MttrError::InvalidMonthFormat(token.to_string()))?;
        Self::starting(first, tz).ok_or_else(|| MttrError::InvalidMonthFormat(token.to_string()))
    }

    fn starting(first: NaiveDate, tz: Tz) -> Option<Self> {
        let next = first.checked_add_months(Months::new(1))?;
        let start = localize(tz, first.and_hms_opt(0, 0, 0)?)?;
        let end = localize(tz, next.and_hms_opt(0, 0, 0)?)?;
        Some(Self { start, end })
    }

    /// First instant of the month (inclusive).
    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    /// First instant of the following month (exclusive).
    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    /// Timezone the window was built in.
    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    /// `YYYY-MM` label of the month.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.start.year(), self.start.month())
    }

    /// `true` when `start <= instant < end`.
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%dT%H:%M:%S%:z"),
            self.end.format("%Y-%m-%dT%H:%M:%S%:z")
        )
    }
}

// ── Month token parsing ───────────────────────────────────────────────────────

/// Parse a year-month expression into the first day of that month.
fn parse_month_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim();

    let year_first = Regex::new(r"^(\d{4})[-/.](\d{1,2})$").expect("regex is valid");
    if let Some(caps) = year_first.captures(token) {
        return first_of(caps[1].parse().ok()?, caps[2].parse().ok()?);
    }

    let month_first = Regex::new(r"^(\d{1,2})[-/.](\d{4})$").expect("regex is valid");
    if let Some(caps) = month_first.captures(token) {
        return first_of(caps[2].parse().ok()?, caps[1].parse().ok()?);
    }

    let full_date = Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("regex is valid");
    if let Some(caps) = full_date.captures(token) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return date.with_day(1);
    }

    let name_first = Regex::new(r"^([A-Za-z]+)\.?,?\s+(\d{4})$").expect("regex is valid");
    if let Some(caps) = name_first.captures(token) {
        let month = Month::from_str(&caps[1]).ok()?;
        return first_of(caps[2].parse().ok()?, month.number_from_month());
    }

    let name_last = Regex::new(r"^(\d{4})\s+([A-Za-z]+)$").expect("regex is valid");
    if let Some(caps) = name_last.captures(token) {
        let month = Month::from_str(&caps[2]).ok()?;
        return first_of(caps[1].parse().ok()?, month.number_from_month());
    }

    None
}

fn first_of(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
