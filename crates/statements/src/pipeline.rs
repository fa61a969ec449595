//! End-to-end statement retrieval.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use statements_cache::InMemoryCache;
use statements_core::{
    Company, ConsolidatedStatements, Filing, FilingCategory, FilingDataSource, PeriodLabel,
    Result, StatementExtract, StatementType, StatementsError, Symbol, available_periods,
};
use statements_edgar::{
    CikResolver, Dataset, DatasetLoader, EdgarClient, EdgarConfig, TickerTable,
    extract_statements, locate_filings,
};
use statements_export::{ExportArtifact, OutputFormat, export};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::aggregate;

/// Upper bound on the years of history a request may ask for.
pub const MAX_YEARS: u32 = 5;

/// What to retrieve and how to export it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRequest {
    /// Ticker symbol, matched case-insensitively.
    pub ticker: String,
    /// Annual (10-K) or quarterly (10-Q) filings.
    pub category: FilingCategory,
    /// Years of history, 1 to [`MAX_YEARS`].
    pub years: u32,
    /// Requested output formats.
    pub formats: Vec<OutputFormat>,
}

impl StatementRequest {
    /// Creates a request exporting both a workbook and CSV files.
    #[must_use]
    pub fn new(ticker: impl Into<String>, category: FilingCategory, years: u32) -> Self {
        Self {
            ticker: ticker.into(),
            category,
            years,
            formats: vec![OutputFormat::Spreadsheet, OutputFormat::Delimited],
        }
    }

    /// Replaces the output formats.
    #[must_use]
    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Number of filings the request covers.
    #[must_use]
    pub const fn requested_filings(&self) -> usize {
        self.years as usize * self.category.filings_per_year()
    }

    /// Checks the request before any network access.
    ///
    /// # Errors
    /// Returns [`StatementsError::InvalidParameter`] for an empty ticker, no
    /// output format, or a year count outside `1..=MAX_YEARS`.
    pub fn validate(&self) -> Result<()> {
        if Symbol::new(self.ticker.as_str()).is_empty() {
            return Err(StatementsError::InvalidParameter(
                "Please enter a ticker symbol".to_string(),
            ));
        }
        if self.formats.is_empty() {
            return Err(StatementsError::InvalidParameter(
                "Select at least one output format".to_string(),
            ));
        }
        if !(1..=MAX_YEARS).contains(&self.years) {
            return Err(StatementsError::InvalidParameter(format!(
                "years must be between 1 and {MAX_YEARS}, got {}",
                self.years
            )));
        }
        Ok(())
    }
}

/// The outcome of a successful run.
#[derive(Debug, Clone)]
pub struct StatementReport {
    /// The resolved company.
    pub company: Company,
    /// Located filings, oldest first.
    pub filings: Vec<Filing>,
    /// Consolidated statements over all filings.
    pub statements: ConsolidatedStatements,
}

impl StatementReport {
    /// Record count per statement.
    #[must_use]
    pub fn row_counts(&self) -> Vec<(StatementType, usize)> {
        self.statements.row_counts()
    }

    /// Builds the export artifacts for `formats`, named after the ticker.
    ///
    /// # Errors
    /// Returns [`StatementsError::Export`] if an artifact cannot be written.
    pub fn export(&self, formats: &[OutputFormat]) -> Result<Vec<ExportArtifact>> {
        export(&self.statements, self.company.symbol.as_str(), formats)
    }
}

/// Runs requests from ticker to consolidated statements.
///
/// Steps run one after another: resolution, then for each available period
/// (most recent first) dataset loading, filing lookup and extraction, until
/// enough filings are collected.
#[derive(Debug, Clone)]
pub struct StatementsPipeline {
    resolver: CikResolver,
    loader: DatasetLoader,
}

impl StatementsPipeline {
    /// Creates a pipeline over `source` with in-memory caches living for `cache_ttl`.
    pub fn new(source: Arc<dyn FilingDataSource>, config: &EdgarConfig) -> Self {
        let tickers = InMemoryCache::<String, Arc<TickerTable>>::with_ttl(config.cache_ttl);
        let datasets = InMemoryCache::<PeriodLabel, Arc<Dataset>>::with_ttl(config.cache_ttl);
        Self::with_parts(
            CikResolver::new(Arc::clone(&source), Arc::new(tickers)),
            DatasetLoader::new(source, Arc::new(datasets)),
        )
    }

    /// Creates a pipeline talking to the SEC with `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: EdgarConfig) -> Result<Self> {
        let client = EdgarClient::with_config(config.clone())?;
        Ok(Self::new(Arc::new(client), &config))
    }

    /// Creates a pipeline from an explicit resolver and loader.
    pub const fn with_parts(resolver: CikResolver, loader: DatasetLoader) -> Self {
        Self { resolver, loader }
    }

    /// Runs `request` against the periods published as of today.
    ///
    /// # Errors
    /// See [`run_as_of`](Self::run_as_of).
    pub async fn run(&self, request: &StatementRequest) -> Result<StatementReport> {
        self.run_as_of(request, Utc::now().date_naive()).await
    }

    /// Runs `request` against the periods published as of `today`.
    ///
    /// Periods whose dataset cannot be loaded and filings that fail to
    /// extract are logged and skipped.
    ///
    /// # Errors
    /// - [`StatementsError::InvalidParameter`] if the request is invalid
    /// - [`StatementsError::TickerNotFound`] or [`StatementsError::SourceUnavailable`] from resolution
    /// - [`StatementsError::NoFilingsFound`] if no filing was located
    /// - [`StatementsError::NoExtractableData`] if no filing produced a statement row
    #[instrument(skip(self, request), fields(ticker = %request.ticker, form = %request.category))]
    pub async fn run_as_of(
        &self,
        request: &StatementRequest,
        today: NaiveDate,
    ) -> Result<StatementReport> {
        request.validate()?;

        let evicted = self.loader.evict_stale().await;
        if evicted > 0 {
            debug!(evicted, "Dropped expired datasets");
        }

        let company = self.resolver.resolve(&request.ticker).await?;
        info!(cik = %company.cik, name = %company.name, "Resolved ticker");

        let wanted = request.requested_filings();
        let mut located = 0usize;
        let mut collected: Vec<(Filing, StatementExtract)> = Vec::with_capacity(wanted);

        for period in available_periods(today) {
            if located >= wanted {
                break;
            }
            let Some(dataset) = self.loader.load(period).await else {
                continue;
            };

            for filing in locate_filings(company.cik, request.category, &dataset) {
                if located >= wanted {
                    break;
                }
                located += 1;
                match extract_statements(&filing, &dataset) {
                    Ok(extract) => collected.push((filing, extract)),
                    Err(e) => {
                        warn!(accession = %filing.accession, error = %e, "Skipping filing");
                    }
                }
            }
            debug!(period = %period, located, wanted, "Scanned period");
        }

        let form = request.category.form().to_string();
        if located == 0 {
            return Err(StatementsError::NoFilingsFound {
                cik: company.cik.to_string(),
                form,
            });
        }

        // Oldest first, undated filings last.
        collected.sort_by_key(|(filing, _)| (filing.period_end.is_none(), filing.period_end));

        let mut filings = Vec::with_capacity(collected.len());
        let mut extracts = Vec::with_capacity(collected.len());
        for (filing, extract) in collected {
            if !extract.is_empty() {
                extracts.push((filing.period_label(), extract));
            }
            filings.push(filing);
        }

        if extracts.is_empty() {
            return Err(StatementsError::NoExtractableData {
                cik: company.cik.to_string(),
                form,
            });
        }

        let statements = aggregate(extracts)?;
        info!(filings = filings.len(), "Consolidated statements");

        Ok(StatementReport {
            company,
            filings,
            statements,
        })
    }
}
