//! Fill in missing sentiment scores for stored articles.

use std::collections::HashSet;
use std::fmt;

use sentinews_core::{ArticleRecord, ArticleStore, StoreError};

use crate::analyzer::SentimentAnalyzer;
use crate::error::SentimentError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Distinct records that received at least one new score.
    pub records_updated: usize,
    pub scores_written: usize,
    /// `(record, analyzer)` pairs that failed and were left unscored.
    pub skipped: usize,
}

impl fmt::Display for BackfillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records updated, {} scores written, {} skipped",
            self.records_updated, self.scores_written, self.skipped
        )
    }
}

/// Score every record that is missing a score from one of `analyzers`.
///
/// Titles are the scored text. Each `(record, analyzer)` pair is handled
/// independently: an evaluation failure or a record that disappeared
/// between listing and writing is logged and counted in `skipped`. Running
/// twice in a row writes nothing the second time.
///
/// `limit` bounds how many scores each analyzer writes. Records that fail
/// are stepped over, so a run of unscoreable titles at the front of the
/// queue never starves the records behind them.
///
/// # Errors
///
/// Returns [`SentimentError::Store`] only when listing unscored records
/// fails.
pub async fn run_backfill<S, A>(
    store: &S,
    analyzers: &[A],
    limit: Option<usize>,
) -> Result<BackfillReport, SentimentError>
where
    S: ArticleStore,
    A: SentimentAnalyzer,
{
    let mut report = BackfillReport::default();
    let mut updated: HashSet<String> = HashSet::new();

    for analyzer in analyzers {
        let kind = analyzer.kind();
        // Rows that failed this pass stay at the front of the unscored list;
        // over-fetch by that many and filter them out.
        let mut failed: HashSet<String> = HashSet::new();
        let mut written = 0usize;

        loop {
            let request = limit.map(|n| n.saturating_sub(written).saturating_add(failed.len()));
            if request == Some(failed.len()) {
                break;
            }
            let listed = store.list_unscored(kind, request).await?;
            let exhausted = request.is_none_or(|n| listed.len() < n);
            let pending: Vec<_> = listed
                .into_iter()
                .filter(|r| !failed.contains(&r.url))
                .collect();
            tracing::info!(analyzer = %kind, pending = pending.len(), "backfilling scores");
            if pending.is_empty() {
                break;
            }

            for record in pending {
                if score_record(store, analyzer, &record).await {
                    written += 1;
                    report.scores_written += 1;
                    updated.insert(record.url);
                } else {
                    report.skipped += 1;
                    failed.insert(record.url);
                }
            }

            if exhausted {
                break;
            }
        }
    }

    report.records_updated = updated.len();
    tracing::info!(
        records_updated = report.records_updated,
        scores_written = report.scores_written,
        skipped = report.skipped,
        "backfill complete"
    );
    Ok(report)
}

/// Score one record and write it. Failures are logged and reported as
/// `false` so the caller can count them and move past the record.
async fn score_record<S, A>(store: &S, analyzer: &A, record: &ArticleRecord) -> bool
where
    S: ArticleStore,
    A: SentimentAnalyzer,
{
    let kind = analyzer.kind();
    let score = match analyzer.evaluate(&record.title) {
        Ok(score) => score,
        Err(e) => {
            tracing::warn!(url = %record.url, analyzer = %kind, error = %e, "scoring failed; skipping");
            return false;
        }
    };

    match store.update_scores(&record.url, &score).await {
        Ok(()) => true,
        Err(StoreError::NotFound { url }) => {
            tracing::warn!(url = %url, analyzer = %kind, "record deleted before score was written");
            false
        }
        Err(e) => {
            tracing::warn!(url = %record.url, analyzer = %kind, error = %e, "score write failed; skipping");
            false
        }
    }
}

#[cfg(test)]
#[path = "backfill_test.rs"]
mod tests;
