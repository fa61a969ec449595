//! Filing category definitions.
//!
//! [`FilingCategory`] selects between annual (10-K) and quarterly (10-Q) reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatementsError;

/// Filing cadence requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingCategory {
    /// Annual reports (form 10-K).
    #[default]
    Annual,
    /// Quarterly reports (form 10-Q).
    Quarterly,
}

impl FilingCategory {
    /// Returns the SEC form type for this category.
    #[must_use]
    pub const fn form(&self) -> &'static str {
        match self {
            Self::Annual => "10-K",
            Self::Quarterly => "10-Q",
        }
    }

    /// Number of filings a company publishes per year in this category.
    #[must_use]
    pub const fn filings_per_year(&self) -> usize {
        match self {
            Self::Annual => 1,
            Self::Quarterly => 4,
        }
    }

    /// Duration, in quarters, of the facts that naturally belong to this category.
    #[must_use]
    pub const fn duration_quarters(&self) -> u32 {
        match self {
            Self::Annual => 4,
            Self::Quarterly => 1,
        }
    }
}

impl fmt::Display for FilingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form())
    }
}

impl FromStr for FilingCategory {
    type Err = StatementsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "10-k" | "10k" => Ok(Self::Annual),
            "quarterly" | "10-q" | "10q" => Ok(Self::Quarterly),
            other => Err(StatementsError::InvalidParameter(format!(
                "unknown filing category: {other}"
            ))),
        }
    }
}
