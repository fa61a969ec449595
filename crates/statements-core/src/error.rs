//! Error types for statement operations.
//!
//! This module defines [`StatementsError`] which covers every error that can
//! occur while resolving, fetching, extracting or exporting financial statements.

use thiserror::Error;

/// Errors that can occur during statement operations.
#[derive(Error, Debug)]
pub enum StatementsError {
    /// The ticker has no entry in the identifier table.
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    /// A remote source could not be fetched or decoded.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The company has no filings of the requested form in the searched window.
    #[error("No {form} filings found for CIK {cik}")]
    NoFilingsFound {
        /// The company CIK that was searched.
        cik: String,
        /// The form type that was requested.
        form: String,
    },

    /// Filings were located but none carried a recognised US-GAAP line item.
    #[error("No extractable statement data in {form} filings for CIK {cik}")]
    NoExtractableData {
        /// The company CIK that was searched.
        cik: String,
        /// The form type that was requested.
        form: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error parsing a value.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error building or transforming a statement table.
    #[error("Table error: {0}")]
    Table(String),

    /// Error serializing an export artifact.
    #[error("Export error: {0}")]
    Export(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`StatementsError`].
pub type Result<T> = std::result::Result<T, StatementsError>;

impl From<polars::prelude::PolarsError> for StatementsError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        Self::Table(e.to_string())
    }
}
