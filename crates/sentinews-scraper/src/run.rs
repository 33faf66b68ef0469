//! Drive a collector into an article store.

use std::fmt;

use sentinews_core::{ArticleStore, NewsSource};
use serde::Serialize;

use crate::collector::{CollectionPlan, Collector};
use crate::error::ScraperError;
use crate::fetch::HttpFetch;

/// Per-source counters for one collection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub source: NewsSource,
    /// Well-formed records decoded from search pages.
    pub fetched: usize,
    /// Already seen by the collector or already present in the store.
    pub duplicates: usize,
    /// Titles naming no candidate, or more than one.
    pub off_topic: usize,
    pub inserted: usize,
    /// Pages abandoned after retries, or whose payload did not parse.
    pub page_failures: usize,
    /// Hits missing a URL, title or parseable timestamp.
    pub malformed: usize,
}

impl CollectionReport {
    #[must_use]
    pub fn new(source: NewsSource) -> Self {
        Self {
            source,
            fetched: 0,
            duplicates: 0,
            off_topic: 0,
            inserted: 0,
            page_failures: 0,
            malformed: 0,
        }
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} fetched, {} inserted, {} duplicates, {} off-topic, {} malformed, {} page failures",
            self.source,
            self.fetched,
            self.inserted,
            self.duplicates,
            self.off_topic,
            self.malformed,
            self.page_failures
        )
    }
}

/// Seed `collector` from `store`, run one full pass and insert every
/// emitted record.
///
/// On error the partial counters stay readable through
/// [`Collector::report`]; records inserted before the failure remain.
///
/// # Errors
///
/// Returns whatever stopped the collector (see
/// [`Collector::next_article`]) or [`ScraperError::Store`] if an insert
/// fails.
pub async fn run_collection<F, S>(
    collector: &mut Collector<F>,
    store: &S,
    plan: CollectionPlan,
) -> Result<CollectionReport, ScraperError>
where
    F: HttpFetch,
    S: ArticleStore,
{
    collector.seed_from_store(store).await?;
    collector.begin(plan);

    while let Some(record) = collector.next_article().await? {
        let inserted = store.insert(&record).await?;
        if !inserted {
            tracing::debug!(url = %record.url, "already stored; skipping");
        }
        collector.note_stored(inserted);
    }

    let report = collector.report().clone();
    tracing::info!(
        source = %report.source,
        fetched = report.fetched,
        inserted = report.inserted,
        duplicates = report.duplicates,
        off_topic = report.off_topic,
        malformed = report.malformed,
        page_failures = report.page_failures,
        "collection finished"
    );
    Ok(report)
}
