#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR access for financial statement extraction.
//!
//! This crate covers everything between a ticker and a filing's statements:
//!
//! - [`EdgarClient`] - Rate-limited HTTP source for the ticker table and bulk archives
//! - [`CikResolver`] - Ticker to CIK lookup over a cached ticker table
//! - [`DatasetLoader`] - Cached loading of quarterly Financial Statement Data Sets
//! - [`locate_filings`] - A company's 10-K or 10-Q submissions within a dataset
//! - [`extract_statements`] - Balance sheet, income statement and cash flow of one filing
//!
//! # Example
//!
//! ```no_run
//! use statements_cache::InMemoryCache;
//! use statements_core::{FilingCategory, FilingDataSource, PeriodLabel};
//! use statements_edgar::{
//!     CikResolver, Dataset, DatasetLoader, EdgarClient, TickerTable, extract_statements,
//!     locate_filings,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client: Arc<dyn FilingDataSource> =
//!         Arc::new(EdgarClient::new("MyApp/1.0 (contact@example.com)")?);
//!
//!     let tickers = InMemoryCache::<String, Arc<TickerTable>>::default();
//!     let resolver = CikResolver::new(Arc::clone(&client), Arc::new(tickers));
//!     let company = resolver.resolve("AAPL").await?;
//!
//!     let datasets = InMemoryCache::<PeriodLabel, Arc<Dataset>>::default();
//!     let loader = DatasetLoader::new(client, Arc::new(datasets));
//!     if let Some(dataset) = loader.load("2024q1".parse()?).await {
//!         for filing in locate_filings(company.cik, FilingCategory::Quarterly, &dataset) {
//!             let extract = extract_statements(&filing, &dataset)?;
//!             println!("{}: {} statements", filing.period_label(), extract.iter().count());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

/// HTTP client, configuration and rate limiting.
pub mod client;
/// Quarterly dataset decoding and loading.
pub mod dataset;
/// Statement extraction and tag vocabulary.
pub mod extract;
/// Filing lookup within a dataset.
pub mod locator;
/// Ticker to CIK resolution.
pub mod resolver;

pub use client::{EdgarClient, EdgarConfig};
pub use dataset::{Dataset, DatasetLoader};
pub use extract::{GAAP_MARKER, extract_statements, statement_tags};
pub use locator::locate_filings;
pub use resolver::{CikResolver, TickerTable};
