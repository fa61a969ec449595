//! Core domain types.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Ticker symbol
//! - [`Cik`] - SEC Central Index Key
//! - [`Company`] - A resolved ticker/CIK pair
//! - [`TickerEntry`] - One row of the SEC ticker table
//! - [`Submission`], [`NumericFact`], [`TagDefinition`] - Raw bulk dataset rows
//! - [`Filing`] - A located 10-K or 10-Q submission
//! - [`Fact`] - A numeric fact joined to its tag definition

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::frequency::FilingCategory;

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is empty after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key.
///
/// Displays as the canonical 10-digit zero-padded form used by EDGAR URLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cik(u64);

impl Cik {
    /// Width of the zero-padded representation.
    pub const WIDTH: usize = 10;

    /// Wraps a raw CIK number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw CIK number.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the zero-padded 10-digit form.
    #[must_use]
    pub fn padded(&self) -> String {
        format!("{:0width$}", self.0, width = Self::WIDTH)
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = Self::WIDTH)
    }
}

impl FromStr for Cik {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// A company resolved from its ticker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Company {
    /// Display ticker.
    pub symbol: Symbol,
    /// Canonical identifier.
    pub cik: Cik,
    /// Registrant name from the ticker table.
    pub name: String,
}

/// One row of the SEC `company_tickers.json` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// CIK as a number (the SEC publishes it as an integer).
    pub cik_str: u64,
    /// Ticker symbol.
    pub ticker: String,
    /// Company name.
    #[serde(default)]
    pub title: String,
}

/// A row of `sub.txt`: one submission, all fields as published text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Submission {
    /// Accession number.
    pub adsh: String,
    /// Registrant CIK, not zero-padded.
    pub cik: String,
    /// Registrant name.
    pub name: String,
    /// Form type, e.g. `10-K`.
    pub form: String,
    /// Filing date, `yyyymmdd`.
    pub filed: String,
    /// Balance sheet date, `yyyymmdd`.
    pub period: String,
    /// Fiscal year.
    pub fy: String,
    /// Fiscal period, e.g. `FY` or `Q2`.
    pub fp: String,
}

/// A row of `num.txt`: one numeric value, all fields as published text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericFact {
    /// Accession number of the owning submission.
    pub adsh: String,
    /// Tag name.
    pub tag: String,
    /// Taxonomy version, e.g. `us-gaap/2023`, or the accession for custom tags.
    pub version: String,
    /// Period end date, `yyyymmdd`.
    pub ddate: String,
    /// Duration in quarters; `0` for point-in-time values.
    pub qtrs: String,
    /// Unit of measure.
    pub uom: String,
    /// Dimensional qualifiers (newer data sets).
    pub segments: String,
    /// Co-registrant, if the value is not for the filer itself.
    pub coreg: String,
    /// Reported value.
    pub value: String,
}

/// A row of `tag.txt`: one tag definition, all fields as published text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagDefinition {
    /// Tag name.
    pub tag: String,
    /// Taxonomy version.
    pub version: String,
    /// Human-readable label.
    pub tlabel: String,
}

/// A located periodic filing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    /// Accession number.
    pub accession: String,
    /// Registrant CIK.
    pub cik: Cik,
    /// Registrant name.
    pub name: String,
    /// Filing category.
    pub category: FilingCategory,
    /// Filing date.
    pub filed: Option<NaiveDate>,
    /// Period end (balance sheet) date.
    pub period_end: Option<NaiveDate>,
    /// Fiscal year.
    pub fiscal_year: Option<i32>,
    /// Fiscal period label.
    pub fiscal_period: String,
}

impl Filing {
    /// Label used for this filing in consolidated statements.
    ///
    /// The ISO period end date, falling back to the accession number.
    #[must_use]
    pub fn period_label(&self) -> String {
        self.period_end
            .map_or_else(|| self.accession.clone(), |d| d.to_string())
    }
}

/// A numeric fact joined to its tag definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Accession number of the owning submission.
    pub accession: String,
    /// Tag name.
    pub tag: String,
    /// Human-readable label.
    pub label: String,
    /// Reported value as text.
    pub value: String,
    /// Unit of measure.
    pub uom: String,
    /// Period end date.
    pub period_end: Option<NaiveDate>,
    /// Duration in quarters; `None` for instant facts.
    pub quarters: Option<u32>,
    /// Taxonomy version.
    pub version: String,
    /// True when the value is qualified by segments or reported for a co-registrant.
    pub dimensional: bool,
}

/// Parses a `yyyymmdd` (or ISO) date as published in the bulk data sets.
#[must_use]
pub fn parse_sec_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
