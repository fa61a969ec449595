//! Quarterly dataset partitions.
//!
//! The SEC publishes one Financial Statement Data Set per calendar quarter,
//! labelled `<year>q<quarter>`. [`available_periods`] enumerates the labels that
//! are likely to be published as of a given date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatementsError;

/// First year covered by the period catalog.
pub const EPOCH_YEAR: i32 = 2020;

/// Number of most recent calendar quarters (including the current one) that
/// are treated as not yet published.
pub const PUBLICATION_LAG_QUARTERS: u32 = 2;

/// Label of one quarterly bulk dataset, e.g. `2024q1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodLabel {
    year: i32,
    quarter: u32,
}

impl PeriodLabel {
    /// Creates a label, returning `None` if the quarter is outside `1..=4`.
    #[must_use]
    pub const fn new(year: i32, quarter: u32) -> Option<Self> {
        if quarter >= 1 && quarter <= 4 {
            Some(Self { year, quarter })
        } else {
            None
        }
    }

    /// Calendar year of the dataset.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar quarter of the dataset (1-4).
    #[must_use]
    pub const fn quarter(&self) -> u32 {
        self.quarter
    }

    /// The calendar quarter containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }

    /// The quarter immediately before this one.
    #[must_use]
    pub const fn previous(&self) -> Self {
        if self.quarter == 1 {
            Self {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}q{}", self.year, self.quarter)
    }
}

impl FromStr for PeriodLabel {
    type Err = StatementsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StatementsError::Parse(format!("invalid period label: {s}"));
        let (year, quarter) = s.trim().split_once(['q', 'Q']).ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let quarter = quarter.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, quarter).ok_or_else(invalid)
    }
}

/// Last quarter whose dataset is expected to be published as of `today`.
///
/// The current quarter and the one before it are excluded, so Q1 and Q2 roll
/// back into the previous year (`4 + (current - 2)`).
#[must_use]
pub fn last_available_period(today: NaiveDate) -> PeriodLabel {
    let current = PeriodLabel::containing(today);
    if current.quarter <= PUBLICATION_LAG_QUARTERS {
        PeriodLabel {
            year: current.year - 1,
            quarter: 4 + current.quarter - PUBLICATION_LAG_QUARTERS,
        }
    } else {
        PeriodLabel {
            year: current.year,
            quarter: current.quarter - PUBLICATION_LAG_QUARTERS,
        }
    }
}

/// Every period label from the last available quarter back to `2020q1`,
/// most recent first.
#[must_use]
pub fn available_periods(today: NaiveDate) -> Vec<PeriodLabel> {
    let mut periods = Vec::new();
    let mut period = last_available_period(today);
    while period.year >= EPOCH_YEAR {
        periods.push(period);
        period = period.previous();
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn label(s: &str) -> PeriodLabel {
        s.parse().unwrap()
    }

    #[test]
    fn test_label_round_trip() {
        let p = label("2024q3");
        assert_eq!(p.year(), 2024);
        assert_eq!(p.quarter(), 3);
        assert_eq!(p.to_string(), "2024q3");
        assert!("2024q5".parse::<PeriodLabel>().is_err());
        assert!("2024".parse::<PeriodLabel>().is_err());
    }

    #[test]
    fn test_second_quarter_rolls_back_a_year() {
        let periods = available_periods(date(2024, 5, 15));
        assert_eq!(periods[0], label("2023q4"));
        assert!(!periods.contains(&label("2024q2")));
        assert!(!periods.contains(&label("2024q1")));
    }

    #[test]
    fn test_first_quarter_rolls_back_a_year() {
        assert_eq!(last_available_period(date(2025, 2, 1)), label("2024q3"));
    }

    #[test]
    fn test_later_quarters_stay_in_year() {
        assert_eq!(last_available_period(date(2024, 8, 30)), label("2024q1"));
        assert_eq!(last_available_period(date(2026, 10, 17)), label("2026q2"));
    }

    #[test]
    fn test_catalog_is_descending_and_bounded() {
        let periods = available_periods(date(2024, 5, 15));
        assert!(periods.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(*periods.last().unwrap(), label("2020q1"));
        assert!(periods.iter().all(|p| p.year() >= EPOCH_YEAR));
        // 2020q1..=2023q4
        assert_eq!(periods.len(), 16);
    }

    #[test]
    fn test_catalog_before_epoch_is_empty() {
        assert!(available_periods(date(2020, 4, 1)).is_empty());
        assert_eq!(available_periods(date(2020, 7, 1)), vec![label("2020q1")]);
    }
}
