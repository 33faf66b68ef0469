//! [`ArticleStore`] backed by Postgres.

use std::collections::HashSet;

use sentinews_core::{
    AnalyzerKind, ArticleRecord, ArticleStore, ArticleTitle, ArticleUpdate, NewsSource,
    SentimentScore, StoreError,
};
use sqlx::PgPool;

use crate::articles::{self, ArticleRow};
use crate::DbError;

/// Cheap to clone; every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn store_error(url: &str, err: DbError) -> StoreError {
    match err {
        DbError::NotFound => StoreError::NotFound {
            url: url.to_string(),
        },
        DbError::InvalidScore(e) => StoreError::InvalidScore(e),
        other => StoreError::backend(other),
    }
}

fn into_records(rows: Vec<ArticleRow>) -> Result<Vec<ArticleRecord>, StoreError> {
    rows.into_iter()
        .map(|row| row.into_record().map_err(StoreError::backend))
        .collect()
}

impl ArticleStore for PgArticleStore {
    async fn insert(&self, record: &ArticleRecord) -> Result<bool, StoreError> {
        articles::insert_article(&self.pool, record)
            .await
            .map_err(|e| store_error(&record.url, e))
    }

    async fn find(&self, url: &str) -> Result<Option<ArticleRecord>, StoreError> {
        let row = articles::get_article(&self.pool, url)
            .await
            .map_err(|e| store_error(url, e))?;
        row.map(|r| r.into_record().map_err(StoreError::backend))
            .transpose()
    }

    async fn delete(&self, url: &str) -> Result<bool, StoreError> {
        articles::delete_article(&self.pool, url)
            .await
            .map_err(|e| store_error(url, e))
    }

    async fn update_article(
        &self,
        url: &str,
        update: &ArticleUpdate,
    ) -> Result<ArticleRecord, StoreError> {
        let row = articles::update_article(&self.pool, url, update)
            .await
            .map_err(|e| store_error(url, e))?;
        row.into_record().map_err(StoreError::backend)
    }

    async fn list_unscored(
        &self,
        kind: AnalyzerKind,
        limit: Option<usize>,
    ) -> Result<Vec<ArticleRecord>, StoreError> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let rows = articles::list_unscored_articles(&self.pool, kind, limit)
            .await
            .map_err(StoreError::backend)?;
        into_records(rows)
    }

    async fn update_scores(&self, url: &str, score: &SentimentScore) -> Result<(), StoreError> {
        articles::update_article_scores(&self.pool, url, score)
            .await
            .map_err(|e| store_error(url, e))
    }

    async fn source_urls(&self, source: NewsSource) -> Result<HashSet<String>, StoreError> {
        articles::list_source_urls(&self.pool, source)
            .await
            .map_err(StoreError::backend)
    }

    async fn list_titles(&self) -> Result<Vec<ArticleTitle>, StoreError> {
        articles::list_article_titles(&self.pool)
            .await
            .map_err(StoreError::backend)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = articles::count_articles(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
