//! The persistence seam for article records.
//!
//! Collectors and the score backfiller only ever talk to [`ArticleStore`];
//! the Postgres implementation lives in `sentinews-db` and
//! [`MemoryArticleStore`] backs unit tests and the server's test harness.

mod memory;

use std::collections::HashSet;
use std::future::Future;

use thiserror::Error;

use crate::article::{ArticleRecord, ArticleTitle, ArticleUpdate, NewsSource};
use crate::sentiment::{AnalyzerKind, SentimentScore};

pub use memory::MemoryArticleStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("article not found: {url}")]
    NotFound { url: String },

    #[error("invalid score: {0}")]
    InvalidScore(#[from] crate::CoreError),

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Keyed collection of article records. Implementations must make `insert`
/// atomic with respect to concurrent inserts of the same URL.
pub trait ArticleStore: Send + Sync {
    /// Insert `record` unless its URL already exists. Returns `true` when a
    /// new row was written.
    fn insert(
        &self,
        record: &ArticleRecord,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn find(&self, url: &str)
        -> impl Future<Output = Result<Option<ArticleRecord>, StoreError>> + Send;

    /// Remove the record if present. Returns whether anything was deleted.
    fn delete(&self, url: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Apply an explicit metadata correction.
    fn update_article(
        &self,
        url: &str,
        update: &ArticleUpdate,
    ) -> impl Future<Output = Result<ArticleRecord, StoreError>> + Send;

    /// Records whose `kind` score is absent, oldest publication first.
    fn list_unscored(
        &self,
        kind: AnalyzerKind,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<ArticleRecord>, StoreError>> + Send;

    /// Write one analyzer's score. The score is validated before writing.
    fn update_scores(
        &self,
        url: &str,
        score: &SentimentScore,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every stored URL collected from `source`, used to seed dedup sets.
    fn source_urls(
        &self,
        source: NewsSource,
    ) -> impl Future<Output = Result<HashSet<String>, StoreError>> + Send;

    /// URL and title of every record, oldest publication first.
    fn list_titles(&self) -> impl Future<Output = Result<Vec<ArticleTitle>, StoreError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
