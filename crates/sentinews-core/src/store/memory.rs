use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ArticleStore, StoreError};
use crate::article::{ArticleRecord, ArticleTitle, ArticleUpdate, NewsSource};
use crate::sentiment::{AnalyzerKind, SentimentScore};

/// In-process store keyed by URL. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryArticleStore {
    records: Arc<Mutex<BTreeMap<String, ArticleRecord>>>,
}

impl MemoryArticleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, ArticleRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every record, ordered by URL.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ArticleRecord> {
        self.lock().values().cloned().collect()
    }
}

impl ArticleStore for MemoryArticleStore {
    async fn insert(&self, record: &ArticleRecord) -> Result<bool, StoreError> {
        let mut records = self.lock();
        if records.contains_key(&record.url) {
            return Ok(false);
        }
        records.insert(record.url.clone(), record.clone());
        Ok(true)
    }

    async fn find(&self, url: &str) -> Result<Option<ArticleRecord>, StoreError> {
        Ok(self.lock().get(url).cloned())
    }

    async fn delete(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.lock().remove(url).is_some())
    }

    async fn update_article(
        &self,
        url: &str,
        update: &ArticleUpdate,
    ) -> Result<ArticleRecord, StoreError> {
        let mut records = self.lock();
        let record = records.get_mut(url).ok_or_else(|| StoreError::NotFound {
            url: url.to_string(),
        })?;
        record.apply(update);
        Ok(record.clone())
    }

    async fn list_unscored(
        &self,
        kind: AnalyzerKind,
        limit: Option<usize>,
    ) -> Result<Vec<ArticleRecord>, StoreError> {
        let mut unscored: Vec<ArticleRecord> = self
            .lock()
            .values()
            .filter(|r| r.scores.get(kind).is_none())
            .cloned()
            .collect();
        unscored.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.url.cmp(&b.url))
        });
        if let Some(limit) = limit {
            unscored.truncate(limit);
        }
        Ok(unscored)
    }

    async fn update_scores(&self, url: &str, score: &SentimentScore) -> Result<(), StoreError> {
        score.validate()?;
        let mut records = self.lock();
        let record = records.get_mut(url).ok_or_else(|| StoreError::NotFound {
            url: url.to_string(),
        })?;
        record.scores.set(*score);
        Ok(())
    }

    async fn source_urls(&self, source: NewsSource) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|r| r.source == source)
            .map(|r| r.url.clone())
            .collect())
    }

    async fn list_titles(&self) -> Result<Vec<ArticleTitle>, StoreError> {
        let mut records: Vec<ArticleRecord> = self.lock().values().cloned().collect();
        records.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.url.cmp(&b.url))
        });
        Ok(records
            .into_iter()
            .map(|r| ArticleTitle {
                url: r.url,
                title: r.title,
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(u64::try_from(self.lock().len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
