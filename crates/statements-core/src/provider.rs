//! Data source traits for fetching SEC payloads.
//!
//! This module defines the seam between the extraction pipeline and the network:
//!
//! - [`DataProvider`] - Base trait carrying provider metadata
//! - [`FilingDataSource`] - The ticker table and quarterly bulk archives

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, period::PeriodLabel, types::TickerEntry};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Source of the SEC identifier table and Financial Statement Data Sets.
///
/// Implementations perform one request per call and report failures as
/// [`StatementsError::SourceUnavailable`](crate::StatementsError::SourceUnavailable).
/// Callers decide whether a failure is fatal.
#[async_trait]
pub trait FilingDataSource: DataProvider {
    /// Fetches the ticker → CIK table, in published order.
    async fn fetch_ticker_table(&self) -> Result<Vec<TickerEntry>>;

    /// Fetches the raw zip archive of one quarterly dataset.
    async fn fetch_dataset_archive(&self, period: &PeriodLabel) -> Result<Vec<u8>>;
}
