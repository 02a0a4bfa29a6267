//! Calendar periods used to scope queries.
//!
//! All ranges are half-open (`[start, end)`) and expressed in UTC. Calendar
//! arithmetic (days, months, years) happens on local dates in the engine's
//! configured timezone, then each boundary is pinned to local midnight.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// Smallest year accepted for yearly reports.
pub const MIN_YEAR: i32 = 1970;
/// Largest year accepted for yearly reports.
pub const MAX_YEAR: i32 = 9999;

/// Half-open UTC time range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Builds a range, rejecting empty or inverted ones.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<Self> {
        if start >= end {
            return Err(EngineError::InvalidPeriod(
                "invalid range: from must be < to".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Whole calendar year `year` in `tz`.
    pub fn year(year: i32, tz: Tz) -> ResultEngine<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EngineError::InvalidPeriod(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}"
            )));
        }
        let invalid = || EngineError::InvalidPeriod(format!("invalid year: {year}"));
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let next = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
        Self::new(local_midnight(first, tz), local_midnight(next, tz))
    }

    /// The `days` most recent calendar days in `tz`, today included, up to
    /// and including `now`.
    ///
    /// The end is exclusive, so it is placed one nanosecond past `now`.
    pub fn trailing_days(days: u32, now: DateTime<Utc>, tz: Tz) -> ResultEngine<Self> {
        let today = now.with_timezone(&tz).date_naive();
        let first = today
            .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            .ok_or_else(|| EngineError::InvalidPeriod("window out of range".to_string()))?;
        let end = now + chrono::Duration::nanoseconds(1);
        Self::new(local_midnight(first, tz), end)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// A calendar month, written `YYYY-MM`.
///
/// Internally it is the first day of the month, so every value is a valid
/// month by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| EngineError::InvalidPeriod(format!("invalid month: {year}-{month}")))
    }

    /// Month that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self(truncate_to_month(date))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// The following month.
    ///
    /// Day 28 exists in every month and day 28 + 4 always falls into the
    /// next one; truncating that date gives the next month's first day.
    pub fn next(self) -> Self {
        let day_28 = self.0 + Days::new(27);
        Self(truncate_to_month(day_28 + Days::new(4)))
    }

    /// `[first day 00:00, first day of next month 00:00)` in `tz`.
    pub fn range(self, tz: Tz) -> Period {
        Period {
            start: local_midnight(self.0, tz),
            end: local_midnight(self.next().0, tz),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = EngineError;

    /// Parses the strict `YYYY-MM` form (four-digit year, two-digit month).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod(format!("invalid month '{s}', expected YYYY-MM"));

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Month::new(year, month).map_err(|_| invalid())
    }
}

/// Local calendar day of `instant` in `tz`.
pub fn local_day(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

fn truncate_to_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// First instant of `date` in `tz`, as UTC.
///
/// When midnight is skipped by a DST jump the day starts at the end of the
/// gap, which is found by probing forward hour by hour.
pub(crate) fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    for hour in 0..=3 {
        let candidate = midnight + chrono::Duration::hours(hour);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc);
            }
            LocalResult::None => continue,
        }
    }
    Utc.from_utc_datetime(&midnight)
}
