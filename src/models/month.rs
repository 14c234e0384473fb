//! Calendar month identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A calendar month, written `YYYY-MM` on the wire.
///
/// # Examples
///
/// ```
/// use site_ledger::models::YearMonth;
///
/// let month: YearMonth = "2026-02".parse().unwrap();
/// assert_eq!(month.days_in_month(), 28);
/// assert_eq!(month.to_string(), "2026-02");
/// assert!("2026-2x".parse::<YearMonth>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// Creates a month, returning `None` for an out-of-range month number.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Returns the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day)
    }

    /// Number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Returns true if `date` falls in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Iterates every day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first_day
            .iter_days()
            .take_while(move |d| self.contains(*d))
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_bounds() {
        let month: YearMonth = "2024-02".parse().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(month.days().count(), 29);
    }

    #[test]
    fn test_december_rolls_over_year() {
        let month = YearMonth::new(2025, 12).unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_rejects_malformed_months() {
        for bad in ["2026-13", "2026-00", "26-01", "2026/01", "2026-1", ""] {
            assert!(bad.parse::<YearMonth>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let month = YearMonth::new(2026, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2026-03\"");
        let back: YearMonth = serde_json::from_str("\"2026-03\"").unwrap();
        assert_eq!(back, month);
        assert!(serde_json::from_str::<YearMonth>("\"March\"").is_err());
    }

    #[test]
    fn test_containing() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert_eq!(YearMonth::containing(date).to_string(), "2026-10");
    }
}
