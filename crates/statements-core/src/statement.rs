//! Statement types and statement tables.
//!
//! - [`StatementType`] - Balance sheet, income statement or cash flow
//! - [`StatementExtract`] - Per-filing tables produced by extraction
//! - [`ConsolidatedStatements`] - Multi-period tables produced by aggregation

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column names shared by extract and consolidated tables.
pub mod columns {
    /// Tag name.
    pub const TAG: &str = "tag";
    /// Human-readable tag label.
    pub const LABEL: &str = "label";
    /// Reported value (text in extracts, `Float64` once consolidated).
    pub const VALUE: &str = "value";
    /// ISO period end date of the fact.
    pub const DDATE: &str = "ddate";
    /// Unit of measure.
    pub const UOM: &str = "uom";
    /// Duration in quarters (duration statements only).
    pub const QTRS: &str = "qtrs";
    /// Period label appended by aggregation.
    pub const PERIOD: &str = "period";
}

/// The three financial statements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Instant-valued balance sheet.
    BalanceSheet,
    /// Duration-valued income statement.
    IncomeStatement,
    /// Duration-valued cash flow statement.
    CashFlow,
}

impl StatementType {
    /// All statement types in presentation order.
    pub const ALL: [Self; 3] = [Self::BalanceSheet, Self::IncomeStatement, Self::CashFlow];

    /// Fixed worksheet name.
    #[must_use]
    pub const fn sheet_name(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "Balance Sheet",
            Self::IncomeStatement => "Income Statement",
            Self::CashFlow => "Cash Flow",
        }
    }

    /// Snake-case stem used in file names.
    #[must_use]
    pub const fn file_stem(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow",
        }
    }

    /// True for statements made of duration facts.
    #[must_use]
    pub const fn is_duration(&self) -> bool {
        matches!(self, Self::IncomeStatement | Self::CashFlow)
    }

    /// Empty consolidated table with the full schema for this statement.
    #[must_use]
    pub fn empty_consolidated(&self) -> DataFrame {
        let mut cols = vec![
            Column::new(columns::TAG.into(), Vec::<String>::new()),
            Column::new(columns::LABEL.into(), Vec::<String>::new()),
            Column::new(columns::VALUE.into(), Vec::<Option<f64>>::new()),
            Column::new(columns::DDATE.into(), Vec::<String>::new()),
            Column::new(columns::UOM.into(), Vec::<String>::new()),
        ];
        if self.is_duration() {
            cols.push(Column::new(columns::QTRS.into(), Vec::<i64>::new()));
        }
        cols.push(Column::new(columns::PERIOD.into(), Vec::<String>::new()));
        // Columns are uniquely named and equally (zero) sized.
        DataFrame::new(cols).unwrap_or_else(|_| DataFrame::empty())
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Statement tables extracted from one filing.
///
/// Statement types with no selected facts are absent.
#[derive(Clone, Debug, Default)]
pub struct StatementExtract {
    tables: BTreeMap<StatementType, DataFrame>,
}

impl StatementExtract {
    /// Creates an empty extract.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, ignoring empty ones.
    pub fn insert(&mut self, kind: StatementType, table: DataFrame) {
        if table.height() > 0 {
            self.tables.insert(kind, table);
        }
    }

    /// Returns the table for a statement type, if any.
    #[must_use]
    pub fn get(&self, kind: StatementType) -> Option<&DataFrame> {
        self.tables.get(&kind)
    }

    /// Returns true if no statement produced any rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterates over the present tables in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (StatementType, &DataFrame)> {
        self.tables.iter().map(|(k, v)| (*k, v))
    }
}

/// Multi-period statement tables, one per statement type.
///
/// Every statement is always present; a statement no period contributed to is
/// an empty table with the full schema.
#[derive(Clone, Debug)]
pub struct ConsolidatedStatements {
    /// Consolidated balance sheet.
    pub balance_sheet: DataFrame,
    /// Consolidated income statement.
    pub income_statement: DataFrame,
    /// Consolidated cash flow statement.
    pub cash_flow: DataFrame,
}

impl Default for ConsolidatedStatements {
    fn default() -> Self {
        Self {
            balance_sheet: StatementType::BalanceSheet.empty_consolidated(),
            income_statement: StatementType::IncomeStatement.empty_consolidated(),
            cash_flow: StatementType::CashFlow.empty_consolidated(),
        }
    }
}

impl ConsolidatedStatements {
    /// Returns the table for a statement type.
    #[must_use]
    pub const fn get(&self, kind: StatementType) -> &DataFrame {
        match kind {
            StatementType::BalanceSheet => &self.balance_sheet,
            StatementType::IncomeStatement => &self.income_statement,
            StatementType::CashFlow => &self.cash_flow,
        }
    }

    /// Mutable access to the table for a statement type.
    pub fn get_mut(&mut self, kind: StatementType) -> &mut DataFrame {
        match kind {
            StatementType::BalanceSheet => &mut self.balance_sheet,
            StatementType::IncomeStatement => &mut self.income_statement,
            StatementType::CashFlow => &mut self.cash_flow,
        }
    }

    /// Iterates over all three tables in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (StatementType, &DataFrame)> {
        StatementType::ALL.into_iter().map(|k| (k, self.get(k)))
    }

    /// Iterates over the tables that have at least one row.
    pub fn non_empty(&self) -> impl Iterator<Item = (StatementType, &DataFrame)> {
        self.iter().filter(|(_, df)| df.height() > 0)
    }

    /// Record count per statement.
    #[must_use]
    pub fn row_counts(&self) -> Vec<(StatementType, usize)> {
        self.iter().map(|(k, df)| (k, df.height())).collect()
    }

    /// Returns true if every table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.non_empty().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_names() {
        assert_eq!(StatementType::BalanceSheet.sheet_name(), "Balance Sheet");
        assert_eq!(StatementType::IncomeStatement.sheet_name(), "Income Statement");
        assert_eq!(StatementType::CashFlow.sheet_name(), "Cash Flow");
        assert_eq!(StatementType::CashFlow.file_stem(), "cash_flow");
    }

    #[test]
    fn test_empty_consolidated_schema() {
        let bs = StatementType::BalanceSheet.empty_consolidated();
        assert_eq!(bs.height(), 0);
        assert_eq!(bs.width(), 6);
        assert_eq!(bs.column(columns::VALUE).unwrap().dtype(), &DataType::Float64);

        let cf = StatementType::CashFlow.empty_consolidated();
        assert_eq!(cf.width(), 7);
        assert!(cf.column(columns::QTRS).is_ok());
    }

    #[test]
    fn test_default_consolidated_is_empty() {
        let statements = ConsolidatedStatements::default();
        assert!(statements.is_empty());
        assert_eq!(statements.row_counts().len(), 3);
        assert!(statements.row_counts().iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn test_extract_ignores_empty_tables() {
        let mut extract = StatementExtract::new();
        extract.insert(
            StatementType::BalanceSheet,
            StatementType::BalanceSheet.empty_consolidated(),
        );
        assert!(extract.is_empty());
    }
}
