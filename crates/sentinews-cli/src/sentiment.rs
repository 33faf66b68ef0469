//! `backfill` and `score` command handlers.

use sentinews_core::{AnalyzerKind, AppConfig};
use sentinews_db::PgArticleStore;
use sentinews_sentiment::{
    load_analyzer, load_analyzers, run_backfill, Analyzer, SentimentAnalyzer, SentimentConfig,
};

/// Build the requested analyzers, or every configured one when none are named.
fn build_analyzers(
    config: &AppConfig,
    requested: &[AnalyzerKind],
) -> anyhow::Result<Vec<Analyzer>> {
    let sentiment_config = SentimentConfig::from_app_config(config);
    if requested.is_empty() {
        return Ok(load_analyzers(&sentiment_config)?);
    }

    let mut analyzers: Vec<Analyzer> = Vec::with_capacity(requested.len());
    for &kind in requested {
        if analyzers.iter().any(|a| a.kind() == kind) {
            continue;
        }
        analyzers.push(load_analyzer(kind, &sentiment_config)?);
    }
    Ok(analyzers)
}

/// Score every stored article that is missing a score from the selected
/// analyzers.
///
/// # Errors
///
/// Returns an error if an analyzer cannot be loaded or the store cannot be
/// listed. Per-record failures are counted in the report, not propagated.
pub(crate) async fn run_backfill_command(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    requested: &[AnalyzerKind],
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let analyzers = build_analyzers(config, requested)?;
    let store = PgArticleStore::new(pool.clone());

    let report = run_backfill(&store, &analyzers, limit).await?;
    println!("backfill: {report}");
    Ok(())
}

/// Print each selected analyzer's score for `text` as JSON.
///
/// # Errors
///
/// Returns an error if an analyzer cannot be loaded or rejects the text.
pub(crate) fn run_score(
    config: &AppConfig,
    text: &str,
    analyzer: Option<AnalyzerKind>,
) -> anyhow::Result<()> {
    let requested: Vec<AnalyzerKind> = analyzer.into_iter().collect();
    for analyzer in build_analyzers(config, &requested)? {
        let score = analyzer.evaluate(text)?;
        println!("{}", serde_json::to_string(&score)?);
    }
    Ok(())
}
