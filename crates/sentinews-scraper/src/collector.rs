//! Per-source collection state machine.
//!
//! ```text
//! Idle -> Querying -> Normalizing -> Filtering -> Emitting -> (Querying | Done)
//! ```
//!
//! A [`Collector`] owns its deduplication set. Seed it from the store with
//! [`Collector::seed_from_store`], start a pass with [`Collector::begin`] and
//! pull records with [`Collector::next_article`]. A pass always starts at
//! page 0; there is no mid-stream resume.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::Stream;
use sentinews_core::{
    AppConfig, ArticleRecord, ArticleStore, CandidateRoster, DateWindow, NewsSource,
};

use crate::error::ScraperError;
use crate::extract::extract_body;
use crate::fetch::HttpFetch;
use crate::query::{build_query, QueryDescriptor, SourceSettings};
use crate::retry::{is_auth_failure, retry_with_backoff};
use crate::run::CollectionReport;
use crate::sources::normalize_page;

pub const DEFAULT_PAGE_LIMIT: u32 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Querying,
    Normalizing,
    Filtering,
    Emitting,
    Done,
}

/// Cooperative cancellation, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub query: SourceSettings,
    /// Pages requested per topic, starting at page 0.
    pub page_limit: u32,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Page failures in a row that make the source count as unavailable.
    pub max_consecutive_failures: u32,
    /// Fetch each emitted article's page to fill in a missing body.
    pub fetch_bodies: bool,
}

impl CollectorSettings {
    #[must_use]
    pub fn new(query: SourceSettings) -> Self {
        Self {
            query,
            page_limit: DEFAULT_PAGE_LIMIT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: 0,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            fetch_bodies: false,
        }
    }

    #[must_use]
    pub fn from_app_config(source: NewsSource, config: &AppConfig) -> Self {
        Self {
            query: SourceSettings::from_app_config(source, config),
            page_limit: config.page_limit,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            max_consecutive_failures: config.max_consecutive_failures.max(1),
            fetch_bodies: false,
        }
    }
}

/// What one pass covers: the topics to query and the optional date bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPlan {
    pub topics: Vec<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Fixed at plan time so every page of the pass shares one window.
    pub now: DateTime<Utc>,
}

impl CollectionPlan {
    #[must_use]
    pub fn new(topics: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            topics,
            start: None,
            end: None,
            now,
        }
    }

    #[must_use]
    pub fn with_bounds(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

pub struct Collector<F> {
    fetcher: F,
    settings: CollectorSettings,
    roster: CandidateRoster,
    cancel: CancelHandle,
    seen: HashSet<String>,
    state: CollectorState,
    plan: Option<CollectionPlan>,
    topic_index: usize,
    next_page: u32,
    consecutive_failures: u32,
    fetched_page: Option<(String, DateWindow)>,
    candidates: Vec<ArticleRecord>,
    pending: VecDeque<ArticleRecord>,
    report: CollectionReport,
}

impl<F: HttpFetch> Collector<F> {
    /// `roster` decides which titles are on topic; it is independent of the
    /// topics queried in a pass.
    #[must_use]
    pub fn new(fetcher: F, settings: CollectorSettings, roster: CandidateRoster) -> Self {
        let source = settings.query.source;
        Self {
            fetcher,
            settings,
            roster,
            cancel: CancelHandle::new(),
            seen: HashSet::new(),
            state: CollectorState::Idle,
            plan: None,
            topic_index: 0,
            next_page: 0,
            consecutive_failures: 0,
            fetched_page: None,
            candidates: Vec::new(),
            pending: VecDeque::new(),
            report: CollectionReport::new(source),
        }
    }

    #[must_use]
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn source(&self) -> NewsSource {
        self.settings.query.source
    }

    #[must_use]
    pub fn state(&self) -> CollectorState {
        self.state
    }

    /// Counters for the current (or last) pass. `inserted` is filled in by
    /// whoever persists the emitted records.
    #[must_use]
    pub fn report(&self) -> &CollectionReport {
        &self.report
    }

    #[must_use]
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn seed<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.seen.extend(urls);
    }

    /// Pre-load the dedup set with every URL the store already holds for
    /// this collector's source.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Store`] if the store cannot be read.
    pub async fn seed_from_store<S: ArticleStore>(
        &mut self,
        store: &S,
    ) -> Result<usize, ScraperError> {
        let urls = store.source_urls(self.source()).await?;
        let count = urls.len();
        self.seed(urls);
        tracing::debug!(
            source = %self.source(),
            seeded = count,
            "dedup set seeded from store"
        );
        Ok(count)
    }

    /// Start a pass from page 0 of the first topic. The dedup set is kept;
    /// the report is reset.
    pub fn begin(&mut self, plan: CollectionPlan) {
        self.report = CollectionReport::new(self.source());
        self.topic_index = 0;
        self.next_page = 0;
        self.consecutive_failures = 0;
        self.fetched_page = None;
        self.candidates.clear();
        self.pending.clear();
        self.state = if plan.topics.is_empty() {
            CollectorState::Done
        } else {
            CollectorState::Querying
        };
        tracing::info!(
            source = %self.source(),
            topics = plan.topics.len(),
            page_limit = self.settings.page_limit,
            "collection pass started"
        );
        self.plan = Some(plan);
    }

    pub(crate) fn note_stored(&mut self, inserted: bool) {
        if inserted {
            self.report.inserted += 1;
        } else {
            self.report.duplicates += 1;
        }
    }

    /// Advance the state machine until the next on-topic, unseen record is
    /// ready, or the pass is over.
    ///
    /// Returns `Ok(None)` once the collector is `Done` (or was never
    /// started).
    ///
    /// # Errors
    ///
    /// - [`ScraperError::SourceUnavailable`] on 401/403 or after
    ///   `max_consecutive_failures` page failures in a row.
    /// - [`ScraperError::MissingApiKey`] if the source needs a key and has
    ///   none.
    ///
    /// The collector is `Done` after any error.
    pub async fn next_article(&mut self) -> Result<Option<ArticleRecord>, ScraperError> {
        loop {
            match self.state {
                CollectorState::Idle | CollectorState::Done => return Ok(None),
                CollectorState::Querying => {
                    if let Err(e) = self.query_next_page().await {
                        self.state = CollectorState::Done;
                        return Err(e);
                    }
                }
                CollectorState::Normalizing => {
                    if let Err(e) = self.normalize_fetched_page() {
                        self.state = CollectorState::Done;
                        return Err(e);
                    }
                }
                CollectorState::Filtering => self.filter_candidates(),
                CollectorState::Emitting => match self.pending.pop_front() {
                    Some(record) => return Ok(Some(self.complete_body(record).await)),
                    None => self.state = CollectorState::Querying,
                },
            }
        }
    }

    /// Consume the collector as a lazy stream of records. The stream ends
    /// after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<ArticleRecord, ScraperError>> {
        futures::stream::unfold(Some(self), |collector| async move {
            let mut collector = collector?;
            match collector.next_article().await {
                Ok(Some(record)) => Some((Ok(record), Some(collector))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    async fn query_next_page(&mut self) -> Result<(), ScraperError> {
        if self.cancel.is_cancelled() {
            tracing::info!(source = %self.source(), "collection cancelled");
            self.state = CollectorState::Done;
            return Ok(());
        }

        let Some(plan) = self.plan.as_ref() else {
            self.state = CollectorState::Done;
            return Ok(());
        };
        let Some(topic) = plan.topics.get(self.topic_index) else {
            tracing::info!(
                source = %self.source(),
                report = %self.report,
                "collection pass complete"
            );
            self.state = CollectorState::Done;
            return Ok(());
        };
        if self.next_page >= self.settings.page_limit {
            self.next_topic();
            return Ok(());
        }

        let page = self.next_page;
        self.next_page += 1;
        let query = build_query(
            &self.settings.query,
            topic,
            page,
            plan.start,
            plan.end,
            plan.now,
        )?;

        match self.fetch_page(&query).await {
            Ok(body) => {
                self.fetched_page = Some((body, query.window));
                self.state = CollectorState::Normalizing;
                Ok(())
            }
            Err(e @ ScraperError::SourceUnavailable { .. }) => Err(e),
            Err(e) => self.page_failed(&query, &e),
        }
    }

    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<String, ScraperError> {
        let fetcher = &self.fetcher;
        let url = query.url.as_str();
        let source = query.source;
        retry_with_backoff(
            self.settings.max_retries,
            self.settings.retry_backoff_ms,
            move || async move {
                let response = fetcher.get(url).await?;
                if is_auth_failure(response.status) {
                    return Err(ScraperError::SourceUnavailable {
                        news_source: source,
                        reason: format!(
                            "search API rejected the request with HTTP {}",
                            response.status
                        ),
                    });
                }
                if !response.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: response.status,
                        url: strip_query(url).to_string(),
                    });
                }
                Ok(response.body)
            },
        )
        .await
    }

    fn normalize_fetched_page(&mut self) -> Result<(), ScraperError> {
        let Some((body, window)) = self.fetched_page.take() else {
            self.state = CollectorState::Querying;
            return Ok(());
        };
        let page_number = self.next_page.saturating_sub(1);

        match normalize_page(self.source(), &body, &window) {
            Ok(page) if page.is_exhausted() => {
                tracing::debug!(
                    source = %self.source(),
                    page = page_number,
                    "no more results for topic"
                );
                self.consecutive_failures = 0;
                self.next_topic();
                Ok(())
            }
            Ok(page) => {
                self.consecutive_failures = 0;
                self.report.fetched += page.articles.len();
                self.report.malformed += page.malformed;
                if page.malformed > 0 {
                    tracing::debug!(
                        source = %self.source(),
                        page = page_number,
                        malformed = page.malformed,
                        "dropped malformed search hits"
                    );
                }
                self.candidates = page.articles;
                self.state = CollectorState::Filtering;
                Ok(())
            }
            Err(e) => {
                self.state = CollectorState::Querying;
                self.record_failure(page_number, &e)
            }
        }
    }

    fn filter_candidates(&mut self) {
        for record in std::mem::take(&mut self.candidates) {
            if !self.roster.is_on_topic(&record.title) {
                self.report.off_topic += 1;
                continue;
            }
            if !self.seen.insert(record.url.clone()) {
                self.report.duplicates += 1;
                continue;
            }
            self.pending.push_back(record);
        }
        self.state = CollectorState::Emitting;
    }

    async fn complete_body(&self, mut record: ArticleRecord) -> ArticleRecord {
        if !self.settings.fetch_bodies || record.body.is_some() {
            return record;
        }
        match self.fetcher.get(&record.url).await {
            Ok(response) if response.is_success() => {
                record.body = extract_body(record.source, &response.body);
                if record.body.is_none() {
                    tracing::debug!(url = %record.url, "no body text found in article page");
                }
            }
            Ok(response) => {
                tracing::warn!(
                    url = %record.url,
                    status = response.status,
                    "article page fetch failed"
                );
            }
            Err(e) => {
                tracing::warn!(url = %record.url, error = %e, "article page fetch failed");
            }
        }
        record
    }

    fn page_failed(
        &mut self,
        query: &QueryDescriptor,
        err: &ScraperError,
    ) -> Result<(), ScraperError> {
        tracing::warn!(
            source = %self.source(),
            topic = %query.topic,
            page = query.page,
            error = %err,
            "page failed after retries, skipping"
        );
        self.record_failure(query.page, err)
    }

    fn record_failure(&mut self, page: u32, err: &ScraperError) -> Result<(), ScraperError> {
        self.report.page_failures += 1;
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.settings.max_consecutive_failures.max(1) {
            return Err(ScraperError::SourceUnavailable {
                news_source: self.source(),
                reason: format!(
                    "{} consecutive page failures (last on page {page}: {err})",
                    self.consecutive_failures
                ),
            });
        }
        Ok(())
    }

    fn next_topic(&mut self) {
        self.topic_index += 1;
        self.next_page = 0;
        self.state = CollectorState::Querying;
    }
}

/// Drop the query string so API keys never reach logs or error messages.
fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
