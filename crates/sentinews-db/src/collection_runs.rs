//! Database operations for `collection_runs`.

use chrono::{DateTime, Utc};
use sentinews_core::NewsSource;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

macro_rules! run_columns {
    () => {
        "id, public_id, source, trigger_source, status, started_at, completed_at, \
         fetched, duplicates, off_topic, inserted, page_failures, malformed, \
         error_message, created_at"
    };
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `collection_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub source: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub fetched: i32,
    pub duplicates: i32,
    pub off_topic: i32,
    pub inserted: i32,
    pub page_failures: i32,
    pub malformed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-run counters written when a run finishes, successfully or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionRunCounts {
    pub fetched: i32,
    pub duplicates: i32,
    pub off_topic: i32,
    pub inserted: i32,
    pub page_failures: i32,
    pub malformed: i32,
}

// ---------------------------------------------------------------------------
// collection_runs operations
// ---------------------------------------------------------------------------

/// Creates a new collection run for `source` in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_collection_run(
    pool: &PgPool,
    source: NewsSource,
    trigger_source: &str,
) -> Result<CollectionRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, CollectionRunRow>(concat!(
        "INSERT INTO collection_runs (public_id, source, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING ",
        run_columns!()
    ))
    .bind(public_id)
    .bind(source.as_str())
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_collection_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and records its counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_collection_run(
    pool: &PgPool,
    id: i64,
    counts: CollectionRunCounts,
) -> Result<(), DbError> {
    finish_collection_run(pool, id, "succeeded", counts, None).await
}

/// Marks a run as `failed`, recording the counters gathered so far and the
/// error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_collection_run(
    pool: &PgPool,
    id: i64,
    counts: CollectionRunCounts,
    error_message: &str,
) -> Result<(), DbError> {
    finish_collection_run(pool, id, "failed", counts, Some(error_message)).await
}

async fn finish_collection_run(
    pool: &PgPool,
    id: i64,
    status: &str,
    counts: CollectionRunCounts,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = $2, completed_at = NOW(), \
             fetched = $3, duplicates = $4, off_topic = $5, inserted = $6, \
             page_failures = $7, malformed = $8, error_message = $9 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .bind(status)
    .bind(counts.fetched)
    .bind(counts.duplicates)
    .bind(counts.off_topic)
    .bind(counts.inserted)
    .bind(counts.page_failures)
    .bind(counts.malformed)
    .bind(error_message)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_collection_run(pool: &PgPool, id: i64) -> Result<CollectionRunRow, DbError> {
    let row = sqlx::query_as::<_, CollectionRunRow>(concat!(
        "SELECT ",
        run_columns!(),
        " FROM collection_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_runs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CollectionRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CollectionRunRow>(concat!(
        "SELECT ",
        run_columns!(),
        " FROM collection_runs ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
