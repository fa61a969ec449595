//! Quarterly Financial Statement Data Sets.
//!
//! Each archive holds tab-separated `sub.txt` (submissions), `num.txt`
//! (numeric facts) and `tag.txt` (tag definitions). Every field is kept as
//! published text; interpretation happens in the locator and extractor.

use serde::de::DeserializeOwned;
use statements_core::{
    Cache, FilingDataSource, NumericFact, PeriodLabel, Result, StatementsError, Submission,
    TagDefinition,
};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

/// Submissions member of a dataset archive.
pub const SUBMISSIONS_FILE: &str = "sub.txt";
/// Numeric facts member of a dataset archive.
pub const NUMBERS_FILE: &str = "num.txt";
/// Tag definitions member of a dataset archive.
pub const TAGS_FILE: &str = "tag.txt";

/// One decoded quarterly dataset.
#[derive(Debug)]
pub struct Dataset {
    period: PeriodLabel,
    submissions: Vec<Submission>,
    facts: Vec<NumericFact>,
    tags: Vec<TagDefinition>,
    facts_by_accession: HashMap<String, Vec<usize>>,
    tags_by_version: HashMap<(String, String), usize>,
    tags_by_name: HashMap<String, usize>,
}

impl Dataset {
    /// Builds a dataset from decoded tables and indexes it.
    #[must_use]
    pub fn new(
        period: PeriodLabel,
        submissions: Vec<Submission>,
        facts: Vec<NumericFact>,
        tags: Vec<TagDefinition>,
    ) -> Self {
        let mut facts_by_accession: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, fact) in facts.iter().enumerate() {
            facts_by_accession
                .entry(fact.adsh.clone())
                .or_default()
                .push(i);
        }

        let mut tags_by_version = HashMap::with_capacity(tags.len());
        let mut tags_by_name = HashMap::with_capacity(tags.len());
        for (i, def) in tags.iter().enumerate() {
            tags_by_version
                .entry((def.tag.clone(), def.version.clone()))
                .or_insert(i);
            tags_by_name.entry(def.tag.clone()).or_insert(i);
        }

        Self {
            period,
            submissions,
            facts,
            tags,
            facts_by_accession,
            tags_by_version,
            tags_by_name,
        }
    }

    /// Decodes a dataset from its zip archive.
    ///
    /// Rows that fail to decode are skipped; a missing member or a missing
    /// required column fails the whole archive.
    ///
    /// # Errors
    /// Returns [`StatementsError::SourceUnavailable`] if the archive cannot be decoded.
    pub fn from_archive(period: PeriodLabel, bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            StatementsError::SourceUnavailable(format!("{period}: invalid archive: {e}"))
        })?;

        let submissions: Vec<Submission> =
            read_member(&mut archive, period, SUBMISSIONS_FILE, &["adsh", "cik", "form"])?;
        let facts: Vec<NumericFact> = read_member(
            &mut archive,
            period,
            NUMBERS_FILE,
            &["adsh", "tag", "version", "ddate", "qtrs", "value"],
        )?;
        let tags: Vec<TagDefinition> =
            read_member(&mut archive, period, TAGS_FILE, &["tag", "version", "tlabel"])?;

        Ok(Self::new(period, submissions, facts, tags))
    }

    /// The quarter this dataset covers.
    #[must_use]
    pub const fn period(&self) -> PeriodLabel {
        self.period
    }

    /// All submissions.
    #[must_use]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// All numeric facts.
    #[must_use]
    pub fn facts(&self) -> &[NumericFact] {
        &self.facts
    }

    /// All tag definitions.
    #[must_use]
    pub fn tags(&self) -> &[TagDefinition] {
        &self.tags
    }

    /// Numeric facts of one submission, in published order.
    pub fn facts_for<'a>(&'a self, accession: &str) -> impl Iterator<Item = &'a NumericFact> {
        self.facts_by_accession
            .get(accession)
            .into_iter()
            .flatten()
            .map(|&i| &self.facts[i])
    }

    /// Definition of a tag at a taxonomy version.
    ///
    /// An empty version falls back to the first definition with that name.
    #[must_use]
    pub fn tag_definition(&self, tag: &str, version: &str) -> Option<&TagDefinition> {
        let index = if version.is_empty() {
            self.tags_by_name.get(tag)
        } else {
            self.tags_by_version
                .get(&(tag.to_string(), version.to_string()))
        };
        index.map(|&i| &self.tags[i])
    }
}

fn read_member<T, R>(
    archive: &mut ZipArchive<R>,
    period: PeriodLabel,
    name: &str,
    required: &[&str],
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read + Seek,
{
    let file = archive.by_name(name).map_err(|e| {
        StatementsError::SourceUnavailable(format!("{period}: missing {name}: {e}"))
    })?;
    read_table(file, name, required)
        .map_err(|e| StatementsError::SourceUnavailable(format!("{period}: {e}")))
}

/// Reads a tab-separated table with a header row.
///
/// Fields are decoded lossily, so stray non-UTF-8 bytes never drop a row.
fn read_table<T, R>(reader: R, name: &str, required: &[&str]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let headers = csv::StringRecord::from_byte_record_lossy(
        rdr.byte_headers()
            .map_err(|e| StatementsError::Parse(format!("{name}: unreadable header: {e}")))?
            .clone(),
    );
    for column in required {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(StatementsError::Parse(format!(
                "{name}: missing column {column}"
            )));
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut raw = csv::ByteRecord::new();
    while rdr
        .read_byte_record(&mut raw)
        .map_err(|e| StatementsError::Parse(format!("{name}: {e}")))?
    {
        let record = csv::StringRecord::from_byte_record_lossy(raw.clone());
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                if skipped == 0 {
                    debug!(file = name, error = %e, "Skipping malformed row");
                }
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!(file = name, skipped, "Skipped malformed rows");
    }
    debug!(file = name, rows = rows.len(), "Decoded table");
    Ok(rows)
}

/// Loads quarterly datasets through a [`FilingDataSource`], caching each by period.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    source: Arc<dyn FilingDataSource>,
    cache: Arc<dyn Cache<PeriodLabel, Arc<Dataset>>>,
}

impl DatasetLoader {
    /// Create a loader fetching through `source` and caching in `cache`.
    pub fn new(
        source: Arc<dyn FilingDataSource>,
        cache: Arc<dyn Cache<PeriodLabel, Arc<Dataset>>>,
    ) -> Self {
        Self { source, cache }
    }

    /// Fetches and decodes one dataset.
    ///
    /// Returns `None` after logging a warning if the archive cannot be fetched
    /// or decoded, so the caller can move on to the next period.
    #[instrument(skip(self, period), fields(period = %period))]
    pub async fn load(&self, period: PeriodLabel) -> Option<Arc<Dataset>> {
        let source = Arc::clone(&self.source);
        let result = self
            .cache
            .get_or_fetch(
                period,
                Box::pin(async move {
                    let bytes = source.fetch_dataset_archive(&period).await?;
                    let dataset = Dataset::from_archive(period, &bytes)?;
                    info!(
                        submissions = dataset.submissions().len(),
                        facts = dataset.facts().len(),
                        tags = dataset.tags().len(),
                        "Loaded dataset"
                    );
                    Ok::<_, StatementsError>(Arc::new(dataset))
                }),
            )
            .await;

        match result {
            Ok(dataset) => Some(dataset),
            Err(e) => {
                warn!(period = %period, error = %e, "Skipping unavailable dataset");
                None
            }
        }
    }

    /// Drops cached datasets past their lifetime; returns how many were dropped.
    pub async fn evict_stale(&self) -> usize {
        self.cache.invalidate_stale().await
    }
}
