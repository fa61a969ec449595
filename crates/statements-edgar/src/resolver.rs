//! Ticker to CIK resolution.

use statements_core::{
    Cache, Cik, Company, FilingDataSource, Result, StatementsError, Symbol, TickerEntry,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Cache key of the ticker table.
const TICKER_TABLE_KEY: &str = "company_tickers";

/// Ticker lookup table built from the SEC `company_tickers.json`.
///
/// When a ticker appears more than once, the first published entry wins.
#[derive(Debug, Default)]
pub struct TickerTable {
    by_ticker: HashMap<String, (Cik, String)>,
}

impl TickerTable {
    /// Builds the table from entries in published order.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = TickerEntry>) -> Self {
        let mut by_ticker = HashMap::new();
        for entry in entries {
            let ticker = entry.ticker.trim().to_uppercase();
            if let Entry::Vacant(slot) = by_ticker.entry(ticker) {
                slot.insert((Cik::new(entry.cik_str), entry.title));
            }
        }
        Self { by_ticker }
    }

    /// Exact lookup of a normalized symbol.
    #[must_use]
    pub fn lookup(&self, symbol: &Symbol) -> Option<Company> {
        self.by_ticker
            .get(symbol.as_str())
            .map(|(cik, name)| Company {
                symbol: symbol.clone(),
                cik: *cik,
                name: name.clone(),
            })
    }

    /// Number of distinct tickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    /// Returns true if the table has no tickers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }
}

/// Resolves tickers to CIKs over a cached ticker table.
#[derive(Debug, Clone)]
pub struct CikResolver {
    source: Arc<dyn FilingDataSource>,
    cache: Arc<dyn Cache<String, Arc<TickerTable>>>,
}

impl CikResolver {
    /// Create a resolver fetching through `source` and caching in `cache`.
    pub fn new(
        source: Arc<dyn FilingDataSource>,
        cache: Arc<dyn Cache<String, Arc<TickerTable>>>,
    ) -> Self {
        Self { source, cache }
    }

    /// Look up a company's CIK from its ticker symbol.
    ///
    /// The ticker is trimmed and uppercased, then matched exactly.
    ///
    /// # Errors
    /// - [`StatementsError::InvalidParameter`] for an empty ticker
    /// - [`StatementsError::TickerNotFound`] if no entry matches
    /// - [`StatementsError::SourceUnavailable`] if the table cannot be obtained
    #[instrument(skip(self))]
    pub async fn resolve(&self, ticker: &str) -> Result<Company> {
        let symbol = Symbol::new(ticker);
        if symbol.is_empty() {
            return Err(StatementsError::InvalidParameter("Empty ticker".to_string()));
        }

        let table = self.table().await?;
        let company = table
            .lookup(&symbol)
            .ok_or_else(|| StatementsError::TickerNotFound(symbol.to_string()))?;

        debug!("Found CIK {} for ticker {}", company.cik, symbol);
        Ok(company)
    }

    async fn table(&self) -> Result<Arc<TickerTable>> {
        let source = Arc::clone(&self.source);
        self.cache
            .get_or_fetch(
                TICKER_TABLE_KEY.to_string(),
                Box::pin(async move {
                    let entries = source.fetch_ticker_table().await.map_err(|e| match e {
                        StatementsError::SourceUnavailable(_) => e,
                        other => StatementsError::SourceUnavailable(other.to_string()),
                    })?;
                    let table = TickerTable::from_entries(entries);
                    debug!(tickers = table.len(), "Built ticker table");
                    Ok::<_, StatementsError>(Arc::new(table))
                }),
            )
            .await
    }
}
