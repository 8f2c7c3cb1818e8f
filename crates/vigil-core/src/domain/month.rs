//! Calendar months and their time ranges.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{MonthParseError, VigilError};

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::OutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The month containing `instant` as seen from `tz`.
    pub fn containing<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> Self {
        let local = instant.with_timezone(tz);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// `None` past the last representable year.
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Some(Self {
                year: self.year.checked_add(1)?,
                month: 1,
            })
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// First instant of the month in `tz`.
    pub fn start_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Utc>, VigilError> {
        self.first_day()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
            .map(|start| start.with_timezone(&Utc))
            .ok_or_else(|| VigilError::InvalidMonthStart(self.to_string()))
    }

    /// Inclusive range covering the month in `tz`.
    ///
    /// `to` is the start of the next month minus one second, so the range has
    /// one-second resolution at its upper edge.
    pub fn range_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<MonthRange, VigilError> {
        let from = self.start_in(tz)?;
        let next = self
            .next()
            .ok_or_else(|| VigilError::InvalidMonthStart(self.to_string()))?;
        let to = next.start_in(tz)? - TimeDelta::seconds(1);
        Ok(MonthRange { from, to })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || MonthParseError::Format(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(format_err)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(format_err());
        }

        let year = year.parse().map_err(|_| format_err())?;
        let month = month.parse().map_err(|_| format_err())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive `[from, to]` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl MonthRange {
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.from <= time && time <= self.to
    }
}
