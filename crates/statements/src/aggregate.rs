//! Consolidation of per-filing extracts into multi-period statements.

use polars::prelude::*;
use statements_core::statement::columns;
use statements_core::{ConsolidatedStatements, Result, StatementExtract, StatementType};
use tracing::debug;

/// Concatenates per-filing extracts into one table per statement.
///
/// Each `(period_label, extract)` pair contributes its tables in input order,
/// tagged with a `period` column. Values are converted to `Float64`; text
/// that does not parse becomes null. Rows are neither re-sorted nor
/// deduplicated across periods.
///
/// # Errors
/// Returns [`StatementsError::Table`](statements_core::StatementsError::Table)
/// if the tables cannot be combined.
pub fn aggregate(extracts: Vec<(String, StatementExtract)>) -> Result<ConsolidatedStatements> {
    let mut consolidated = ConsolidatedStatements::default();

    for kind in StatementType::ALL {
        let frames: Vec<LazyFrame> = extracts
            .iter()
            .filter_map(|(period, extract)| {
                extract.get(kind).map(|df| {
                    df.clone()
                        .lazy()
                        .with_column(lit(period.as_str()).alias(columns::PERIOD))
                })
            })
            .collect();

        if frames.is_empty() {
            debug!(statement = %kind, "No contributing periods");
            continue;
        }

        let contributors = frames.len();
        let mut df = concat(frames, UnionArgs::default())?.collect()?;
        coerce_values(&mut df)?;

        debug!(
            statement = %kind,
            periods = contributors,
            rows = df.height(),
            "Consolidated statement"
        );
        *consolidated.get_mut(kind) = df;
    }

    Ok(consolidated)
}

fn coerce_values(df: &mut DataFrame) -> Result<()> {
    let parsed: Vec<Option<f64>> = df
        .column(columns::VALUE)?
        .str()?
        .into_iter()
        .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
        .collect();
    df.with_column(Column::new(columns::VALUE.into(), parsed))?;
    Ok(())
}
