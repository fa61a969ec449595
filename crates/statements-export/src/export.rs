//! Export of consolidated statements to XLSX and CSV.
//!
//! Every artifact is built in memory; writing it anywhere is up to the caller.

use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};
use statements_core::{ConsolidatedStatements, Result, StatementsError};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// MIME type of XLSX workbooks.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of CSV files.
pub const CSV_MIME: &str = "text/csv";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One XLSX workbook with a worksheet per statement.
    Spreadsheet,
    /// One CSV file per statement.
    Delimited,
}

impl OutputFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Delimited => "csv",
        }
    }

    /// Get the MIME type for this format.
    pub const fn mime_type(&self) -> &str {
        match self {
            Self::Spreadsheet => XLSX_MIME,
            Self::Delimited => CSV_MIME,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = StatementsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" | "spreadsheet" => Ok(Self::Spreadsheet),
            "csv" => Ok(Self::Delimited),
            other => Err(StatementsError::InvalidParameter(format!(
                "unknown output format: {other}"
            ))),
        }
    }
}

/// A named in-memory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(file_name: String, format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            mime_type: format.mime_type().to_string(),
            bytes,
        }
    }
}

/// Worksheet names a workbook for `statements` would contain, in order.
pub fn sheet_names(statements: &ConsolidatedStatements) -> Vec<&'static str> {
    statements
        .non_empty()
        .map(|(kind, _)| kind.sheet_name())
        .collect()
}

/// Writes every non-empty statement to its own worksheet.
///
/// Returns `None` when all statements are empty, since a workbook needs at
/// least one sheet.
///
/// # Errors
/// Returns [`StatementsError::Export`] if the workbook cannot be written.
#[instrument(skip_all)]
pub fn to_spreadsheet(statements: &ConsolidatedStatements) -> Result<Option<Vec<u8>>> {
    if statements.is_empty() {
        debug!("No statement rows, skipping workbook");
        return Ok(None);
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for (kind, df) in statements.non_empty() {
        let sheet = workbook
            .add_worksheet()
            .set_name(kind.sheet_name())
            .map_err(xlsx_error)?;
        write_sheet(sheet, df, &header)?;
        debug!(sheet = kind.sheet_name(), rows = df.height(), "Wrote worksheet");
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    Ok(Some(bytes))
}

fn write_sheet(sheet: &mut Worksheet, df: &DataFrame, header: &Format) -> Result<()> {
    for (c, column) in df.get_columns().iter().enumerate() {
        let col = u16::try_from(c)
            .map_err(|_| StatementsError::Export("too many columns".to_string()))?;
        sheet
            .write_string_with_format(0, col, column.name().as_str(), header)
            .map_err(xlsx_error)?;

        let series = column.as_materialized_series();
        for i in 0..series.len() {
            let row = u32::try_from(i + 1)
                .map_err(|_| StatementsError::Export("too many rows".to_string()))?;
            write_cell(sheet, row, col, series.get(i)?)?;
        }
    }
    Ok(())
}

/// Numbers become numeric cells, nulls stay empty and everything else is text.
fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: AnyValue<'_>) -> Result<()> {
    let written = match value {
        AnyValue::Null => return Ok(()),
        AnyValue::Float64(v) => sheet.write_number(row, col, v),
        AnyValue::Float32(v) => sheet.write_number(row, col, v),
        AnyValue::Int64(v) => sheet.write_number(row, col, v as f64),
        AnyValue::Int32(v) => sheet.write_number(row, col, v),
        AnyValue::UInt32(v) => sheet.write_number(row, col, v),
        AnyValue::String(s) => sheet.write_string(row, col, s),
        AnyValue::StringOwned(s) => sheet.write_string(row, col, s.as_str()),
        other => sheet.write_string(row, col, other.to_string()),
    };
    written.map(|_| ()).map_err(xlsx_error)
}

fn xlsx_error(e: XlsxError) -> StatementsError {
    StatementsError::Export(e.to_string())
}

/// Writes every non-empty statement as `<TICKER>_<statement>.csv`.
///
/// # Errors
/// Returns [`StatementsError::Export`] if a table cannot be serialized.
#[instrument(skip(statements))]
pub fn to_delimited(
    statements: &ConsolidatedStatements,
    ticker: &str,
) -> Result<Vec<ExportArtifact>> {
    statements
        .non_empty()
        .map(|(kind, df)| {
            let bytes = write_csv(df)?;
            Ok(ExportArtifact::new(
                file_name(ticker, kind.file_stem(), OutputFormat::Delimited),
                OutputFormat::Delimited,
                bytes,
            ))
        })
        .collect()
}

fn write_csv(df: &DataFrame) -> Result<Vec<u8>> {
    let mut df = df.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| StatementsError::Export(e.to_string()))?;
    Ok(buf)
}

/// Produces the artifacts for each requested format, in request order.
///
/// An empty set of statements yields no artifacts.
///
/// # Errors
/// Returns [`StatementsError::Export`] if any artifact cannot be written.
pub fn export(
    statements: &ConsolidatedStatements,
    ticker: &str,
    formats: &[OutputFormat],
) -> Result<Vec<ExportArtifact>> {
    let mut artifacts = Vec::new();
    for format in dedup(formats) {
        match format {
            OutputFormat::Spreadsheet => {
                if let Some(bytes) = to_spreadsheet(statements)? {
                    artifacts.push(ExportArtifact::new(
                        file_name(ticker, "financials", format),
                        format,
                        bytes,
                    ));
                }
            }
            OutputFormat::Delimited => artifacts.extend(to_delimited(statements, ticker)?),
        }
    }
    Ok(artifacts)
}

fn dedup(formats: &[OutputFormat]) -> Vec<OutputFormat> {
    let mut unique = Vec::with_capacity(formats.len());
    for format in formats {
        if !unique.contains(format) {
            unique.push(*format);
        }
    }
    unique
}

fn file_name(ticker: &str, stem: &str, format: OutputFormat) -> String {
    format!(
        "{}_{stem}.{}",
        ticker.trim().to_uppercase(),
        format.extension()
    )
}
