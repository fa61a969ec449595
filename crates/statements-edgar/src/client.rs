//! Rate-limited HTTP access to the SEC endpoints.

use async_trait::async_trait;
use statements_core::{
    DataProvider, FilingDataSource, PeriodLabel, Result, StatementsError, TickerEntry,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

/// SEC company tickers URL
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Base URL of the quarterly Financial Statement Data Set archives
pub const DATASET_BASE_URL: &str =
    "https://www.sec.gov/files/dera/data/financial-statement-data-sets";

/// Default user agent; the SEC asks for a contact address.
pub const DEFAULT_USER_AGENT: &str = "sec-statements/0.1 (research@example.com)";

/// Minimum spacing between requests, well inside the SEC's 10 requests/second.
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(150);

/// Bulk archives run to a few hundred megabytes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default lifetime of cached ticker tables and datasets.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Connection and caching settings for the SEC endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgarConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum interval between two requests.
    pub rate_limit: Duration,
    /// URL of the ticker table.
    pub tickers_url: String,
    /// Base URL of the dataset archives; `<label>.zip` is appended.
    pub dataset_base_url: String,
    /// Lifetime of cached ticker tables and datasets.
    pub cache_ttl: Duration,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: DEFAULT_RATE_LIMIT,
            tickers_url: COMPANY_TICKERS_URL.to_string(),
            dataset_base_url: DATASET_BASE_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl EdgarConfig {
    /// Default settings with the given user agent.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the minimum interval between requests.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the cache lifetime.
    #[must_use]
    pub const fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// URL of the archive for one quarterly dataset.
    #[must_use]
    pub fn dataset_url(&self, period: &PeriodLabel) -> String {
        format!(
            "{}/{}.zip",
            self.dataset_base_url.trim_end_matches('/'),
            period
        )
    }
}

/// Rate limiter to ensure we don't exceed SEC's rate limits.
///
/// The interval is measured from the end of the previous request, so a long
/// archive download still leaves a full gap before the next one starts.
#[derive(Debug)]
struct RateLimiter {
    last_finished: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_finished: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    async fn wait(&self) {
        let elapsed = self.last_finished.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
    }

    fn finish(&mut self) {
        self.last_finished = Instant::now();
    }
}

/// SEC EDGAR client for the ticker table and the bulk datasets.
///
/// Requests run one at a time through a shared rate limiter, and each starts
/// at least the configured interval after the previous one finished.
#[derive(Debug, Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    config: EdgarConfig,
}

impl EdgarClient {
    /// Create a new client with the specified user agent and default settings.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    ///
    /// # Example
    /// ```
    /// use statements_edgar::EdgarClient;
    ///
    /// let client = EdgarClient::new("MyApp/1.0 (contact@example.com)").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_config(EdgarConfig::new(user_agent))
    }

    /// Create a new client from explicit settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| StatementsError::Other(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Create a new client around a pre-configured reqwest client.
    ///
    /// The client's own user agent and timeout take precedence over `config`.
    pub fn with_client(client: reqwest::Client, config: EdgarConfig) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.rate_limit))),
            config,
        }
    }

    /// Returns the client settings.
    #[must_use]
    pub const fn config(&self) -> &EdgarConfig {
        &self.config
    }

    /// Fetches the full body of `url`, holding the rate limiter until the
    /// body has been read.
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut limiter = self.rate_limiter.lock().await;
        limiter.wait().await;
        let body = self.download(url).await;
        limiter.finish();
        body
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StatementsError::SourceUnavailable(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(StatementsError::SourceUnavailable(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            StatementsError::SourceUnavailable(format!("{url}: failed to read body: {e}"))
        })?;
        Ok(bytes.to_vec())
    }
}

impl DataProvider for EdgarClient {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "SEC EDGAR company tickers and quarterly Financial Statement Data Sets"
    }
}

#[async_trait]
impl FilingDataSource for EdgarClient {
    #[instrument(skip(self))]
    async fn fetch_ticker_table(&self) -> Result<Vec<TickerEntry>> {
        let body = self.get(&self.config.tickers_url).await?;

        // Keyed "0", "1", ... in published order.
        let table: BTreeMap<u64, TickerEntry> = serde_json::from_slice(&body).map_err(|e| {
            StatementsError::SourceUnavailable(format!("Failed to parse company tickers: {e}"))
        })?;

        debug!(entries = table.len(), "Fetched company tickers");
        Ok(table.into_values().collect())
    }

    #[instrument(skip(self, period), fields(period = %period))]
    async fn fetch_dataset_archive(&self, period: &PeriodLabel) -> Result<Vec<u8>> {
        let url = self.config.dataset_url(period);
        let bytes = self.get(&url).await?;

        debug!(bytes = bytes.len(), "Fetched dataset archive");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_traits() {
        let client = EdgarClient::new("Test/1.0 (test@example.com)").unwrap();

        assert_eq!(client.name(), "SEC EDGAR");
        assert!(!client.description().is_empty());
        assert_eq!(client.config().user_agent, "Test/1.0 (test@example.com)");
        assert_eq!(client.config().timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_dataset_url() {
        let config = EdgarConfig::default();
        let period: PeriodLabel = "2024q1".parse().unwrap();
        assert_eq!(
            config.dataset_url(&period),
            "https://www.sec.gov/files/dera/data/financial-statement-data-sets/2024q1.zip"
        );
    }

    #[test]
    fn test_ticker_table_keeps_published_order() {
        let json = r#"{
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "10": {"cik_str": 1, "ticker": "LAST", "title": "Last"},
            "2": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"}
        }"#;
        let table: BTreeMap<u64, TickerEntry> = serde_json::from_str(json).unwrap();
        let tickers: Vec<_> = table.into_values().map(|e| e.ticker).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "LAST"]);
    }

    #[tokio::test]
    async fn test_rate_limiting() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));

        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait().await;
            limiter.finish();
        }

        // 2 intervals between 3 requests
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_interval_counts_from_end_of_slow_request() {
        let mut limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.wait().await;
        sleep(Duration::from_millis(300)).await;
        limiter.finish();

        let finished = Instant::now();
        limiter.wait().await;
        assert!(finished.elapsed() >= Duration::from_millis(90));
    }
}
