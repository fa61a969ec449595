#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Spreadsheet and delimited-text exporters.
pub mod export;

pub use export::{
    CSV_MIME, ExportArtifact, OutputFormat, XLSX_MIME, export, sheet_names, to_delimited,
    to_spreadsheet,
};
