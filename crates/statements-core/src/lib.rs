#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for SEC financial statement extraction.
//!
//! This crate provides the foundational abstractions shared by the workspace:
//!
//! - [`FilingDataSource`](provider::FilingDataSource) - Seam over the SEC endpoints
//! - [`Cache`](cache::Cache) - Keyed cache with a pluggable [`ExpiryPolicy`](cache::ExpiryPolicy)
//! - [`PeriodLabel`](period::PeriodLabel) - Quarterly dataset partitions and the period catalog
//! - [`StatementExtract`](statement::StatementExtract) and
//!   [`ConsolidatedStatements`](statement::ConsolidatedStatements) - Statement tables

/// Cache trait and expiry policies.
pub mod cache;
/// Error types for statement operations.
pub mod error;
/// Filing category (annual / quarterly) definitions.
pub mod frequency;
/// Quarterly dataset period labels and the period catalog.
pub mod period;
/// Data source traits for fetching SEC payloads.
pub mod provider;
/// Statement types and statement tables.
pub mod statement;
/// Core domain types (Symbol, Cik, Filing, Fact, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{Cache, ExpiryPolicy, FixedTtl, NeverExpire};
pub use error::{Result, StatementsError};
pub use frequency::FilingCategory;
pub use period::{PeriodLabel, available_periods};
pub use provider::{DataProvider, FilingDataSource};
pub use statement::{ConsolidatedStatements, StatementExtract, StatementType};
pub use types::{
    Cik, Company, Fact, Filing, NumericFact, Submission, Symbol, TagDefinition, TickerEntry,
};
