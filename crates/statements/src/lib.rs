#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Multi-period financial statements from SEC bulk data.
//!
//! This crate re-exports the core types, cache implementations, the EDGAR
//! access layer and the exporters, and provides a [`StatementsPipeline`]
//! that runs a [`StatementRequest`] from ticker to consolidated statements.
//!
//! # Example
//!
//! ```rust,no_run
//! use statements::{EdgarConfig, FilingCategory, OutputFormat, StatementRequest, StatementsPipeline};
//!
//! #[tokio::main]
//! async fn main() -> statements::Result<()> {
//!     let pipeline = StatementsPipeline::from_config(EdgarConfig::new(
//!         "MyApp/1.0 (contact@example.com)",
//!     ))?;
//!
//!     let request = StatementRequest::new("AAPL", FilingCategory::Annual, 3)
//!         .with_formats(vec![OutputFormat::Spreadsheet]);
//!     let report = pipeline.run(&request).await?;
//!
//!     for (statement, rows) in report.statements.row_counts() {
//!         println!("{statement}: {rows} records");
//!     }
//!     for artifact in report.export(&request.formats)? {
//!         std::fs::write(&artifact.file_name, &artifact.bytes).ok();
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use statements_core::*;

// Cache implementations
pub use statements_cache::{InMemoryCache, NoopCache};

// SEC access
pub use statements_edgar::client::DEFAULT_USER_AGENT;
pub use statements_edgar::{
    CikResolver, Dataset, DatasetLoader, EdgarClient, EdgarConfig, TickerTable,
    extract_statements, locate_filings,
};

// Exporters
pub use statements_export::{
    ExportArtifact, OutputFormat, export, sheet_names, to_delimited, to_spreadsheet,
};

mod aggregate;
pub use aggregate::aggregate;

mod pipeline;
pub use pipeline::{MAX_YEARS, StatementReport, StatementRequest, StatementsPipeline};
