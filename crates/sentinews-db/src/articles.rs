//! Database operations for the `articles` table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sentinews_core::{
    AnalyzerKind, ArticleRecord, ArticleScores, ArticleTitle, ArticleUpdate, NewsSource,
    SentimentScore,
};
use sqlx::PgPool;

use crate::DbError;

macro_rules! article_columns {
    () => {
        "url, published_at, title, source, body, \
         lexicon_p_pos, lexicon_p_neg, lexicon_p_neu, lexicon_compound, \
         naive_bayes_p_pos, naive_bayes_p_neg, \
         neural_p_pos, neural_p_neg, neural_p_neu, \
         created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub source: String,
    pub body: Option<String>,
    pub lexicon_p_pos: Option<f64>,
    pub lexicon_p_neg: Option<f64>,
    pub lexicon_p_neu: Option<f64>,
    pub lexicon_compound: Option<f64>,
    pub naive_bayes_p_pos: Option<f64>,
    pub naive_bayes_p_neg: Option<f64>,
    pub neural_p_pos: Option<f64>,
    pub neural_p_neg: Option<f64>,
    pub neural_p_neu: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleRow {
    /// Convert into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if `source` holds an unknown value.
    pub fn into_record(self) -> Result<ArticleRecord, DbError> {
        let source: NewsSource = self.source.parse().map_err(|e: sentinews_core::CoreError| {
            DbError::InvalidColumn {
                column: "source",
                reason: e.to_string(),
            }
        })?;

        // The table's CHECK constraints guarantee each group is all-or-nothing.
        let lexicon = match (
            self.lexicon_p_pos,
            self.lexicon_p_neg,
            self.lexicon_p_neu,
            self.lexicon_compound,
        ) {
            (Some(pos), Some(neg), Some(neu), Some(compound)) => Some(
                SentimentScore::three_class(AnalyzerKind::Lexicon, pos, neg, neu)
                    .with_compound(compound),
            ),
            _ => None,
        };
        let naive_bayes = match (self.naive_bayes_p_pos, self.naive_bayes_p_neg) {
            (Some(pos), Some(neg)) => {
                Some(SentimentScore::two_class(AnalyzerKind::NaiveBayes, pos, neg))
            }
            _ => None,
        };
        let neural = match (self.neural_p_pos, self.neural_p_neg, self.neural_p_neu) {
            (Some(pos), Some(neg), Some(neu)) => Some(SentimentScore::three_class(
                AnalyzerKind::Neural,
                pos,
                neg,
                neu,
            )),
            _ => None,
        };

        Ok(ArticleRecord {
            url: self.url,
            published_at: self.published_at,
            title: self.title,
            source,
            body: self.body,
            scores: ArticleScores {
                lexicon,
                naive_bayes,
                neural,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert an article unless its URL already exists.
///
/// Returns `true` when a new row was written. Concurrent inserts of the same
/// URL are resolved by `ON CONFLICT DO NOTHING`, so exactly one caller sees
/// `true`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScore`] if a score on the record fails
/// validation, or [`DbError::Sqlx`] if the insert fails.
pub async fn insert_article(pool: &PgPool, record: &ArticleRecord) -> Result<bool, DbError> {
    let scores = &record.scores;
    for score in [&scores.lexicon, &scores.naive_bayes, &scores.neural]
        .into_iter()
        .flatten()
    {
        score.validate()?;
    }

    let result = sqlx::query(
        "INSERT INTO articles \
             (url, published_at, title, source, body, \
              lexicon_p_pos, lexicon_p_neg, lexicon_p_neu, lexicon_compound, \
              naive_bayes_p_pos, naive_bayes_p_neg, \
              neural_p_pos, neural_p_neg, neural_p_neu) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (url) DO NOTHING",
    )
    .bind(&record.url)
    .bind(record.published_at)
    .bind(&record.title)
    .bind(record.source.as_str())
    .bind(record.body.as_deref())
    .bind(scores.lexicon.map(|s| s.p_positive))
    .bind(scores.lexicon.map(|s| s.p_negative))
    .bind(scores.lexicon.and_then(|s| s.p_neutral))
    .bind(scores.lexicon.and_then(|s| s.compound))
    .bind(scores.naive_bayes.map(|s| s.p_positive))
    .bind(scores.naive_bayes.map(|s| s.p_negative))
    .bind(scores.neural.map(|s| s.p_positive))
    .bind(scores.neural.map(|s| s.p_negative))
    .bind(scores.neural.and_then(|s| s.p_neutral))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Fetch one article by URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_article(pool: &PgPool, url: &str) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(concat!(
        "SELECT ",
        article_columns!(),
        " FROM articles WHERE url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Delete an article. Returns whether a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_article(pool: &PgPool, url: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM articles WHERE url = $1")
        .bind(url)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Apply a partial metadata update. `None` fields keep their stored value.
/// A new title clears every stored score so the backfill picks the row up
/// again; in `SET`, `title` still refers to the old value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no article has `url`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_article(
    pool: &PgPool,
    url: &str,
    update: &ArticleUpdate,
) -> Result<ArticleRow, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(concat!(
        "UPDATE articles SET \
             published_at = COALESCE($2, published_at), \
             title = COALESCE($3, title), \
             lexicon_p_pos = CASE WHEN COALESCE($3, title) = title THEN lexicon_p_pos END, \
             lexicon_p_neg = CASE WHEN COALESCE($3, title) = title THEN lexicon_p_neg END, \
             lexicon_p_neu = CASE WHEN COALESCE($3, title) = title THEN lexicon_p_neu END, \
             lexicon_compound = CASE WHEN COALESCE($3, title) = title THEN lexicon_compound END, \
             naive_bayes_p_pos = CASE WHEN COALESCE($3, title) = title THEN naive_bayes_p_pos END, \
             naive_bayes_p_neg = CASE WHEN COALESCE($3, title) = title THEN naive_bayes_p_neg END, \
             neural_p_pos = CASE WHEN COALESCE($3, title) = title THEN neural_p_pos END, \
             neural_p_neg = CASE WHEN COALESCE($3, title) = title THEN neural_p_neg END, \
             neural_p_neu = CASE WHEN COALESCE($3, title) = title THEN neural_p_neu END, \
             source = COALESCE($4, source), \
             body = COALESCE($5, body), \
             updated_at = NOW() \
         WHERE url = $1 \
         RETURNING ",
        article_columns!()
    ))
    .bind(url)
    .bind(update.published_at)
    .bind(update.title.as_deref())
    .bind(update.source.map(NewsSource::as_str))
    .bind(update.body.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

fn unscored_sql(kind: AnalyzerKind) -> &'static str {
    match kind {
        AnalyzerKind::Lexicon => concat!(
            "SELECT ",
            article_columns!(),
            " FROM articles WHERE lexicon_p_pos IS NULL \
             ORDER BY published_at ASC, url ASC LIMIT $1"
        ),
        AnalyzerKind::NaiveBayes => concat!(
            "SELECT ",
            article_columns!(),
            " FROM articles WHERE naive_bayes_p_pos IS NULL \
             ORDER BY published_at ASC, url ASC LIMIT $1"
        ),
        AnalyzerKind::Neural => concat!(
            "SELECT ",
            article_columns!(),
            " FROM articles WHERE neural_p_pos IS NULL \
             ORDER BY published_at ASC, url ASC LIMIT $1"
        ),
    }
}

/// Articles with no score from `kind`, oldest first. A `None` limit returns
/// every match (`LIMIT NULL`).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unscored_articles(
    pool: &PgPool,
    kind: AnalyzerKind,
    limit: Option<i64>,
) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(unscored_sql(kind))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Write one analyzer's score columns for an article.
///
/// # Errors
///
/// Returns [`DbError::InvalidScore`] if the score fails validation,
/// [`DbError::NotFound`] if no article has `url`, or [`DbError::Sqlx`] if the
/// update fails.
pub async fn update_article_scores(
    pool: &PgPool,
    url: &str,
    score: &SentimentScore,
) -> Result<(), DbError> {
    score.validate()?;

    let query = match score.kind {
        AnalyzerKind::Lexicon => sqlx::query(
            "UPDATE articles SET \
                 lexicon_p_pos = $2, lexicon_p_neg = $3, \
                 lexicon_p_neu = $4, lexicon_compound = $5, updated_at = NOW() \
             WHERE url = $1",
        )
        .bind(url)
        .bind(score.p_positive)
        .bind(score.p_negative)
        .bind(score.p_neutral)
        .bind(score.compound),
        AnalyzerKind::NaiveBayes => sqlx::query(
            "UPDATE articles SET \
                 naive_bayes_p_pos = $2, naive_bayes_p_neg = $3, updated_at = NOW() \
             WHERE url = $1",
        )
        .bind(url)
        .bind(score.p_positive)
        .bind(score.p_negative),
        AnalyzerKind::Neural => sqlx::query(
            "UPDATE articles SET \
                 neural_p_pos = $2, neural_p_neg = $3, neural_p_neu = $4, updated_at = NOW() \
             WHERE url = $1",
        )
        .bind(url)
        .bind(score.p_positive)
        .bind(score.p_negative)
        .bind(score.p_neutral),
    };

    let result = query.execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Every stored URL collected from `source`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_source_urls(
    pool: &PgPool,
    source: NewsSource,
) -> Result<HashSet<String>, DbError> {
    let urls = sqlx::query_scalar::<_, String>("SELECT url FROM articles WHERE source = $1")
        .bind(source.as_str())
        .fetch_all(pool)
        .await?;

    Ok(urls.into_iter().collect())
}

/// URL and title of every stored article, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_article_titles(pool: &PgPool) -> Result<Vec<ArticleTitle>, DbError> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT url, title FROM articles ORDER BY published_at ASC, url ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(url, title)| ArticleTitle { url, title })
        .collect())
}

/// Total number of stored articles.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_articles(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
