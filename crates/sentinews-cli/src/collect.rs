//! `collect` and `runs` command handlers.
//!
//! Every selected source runs concurrently as its own collection run. One
//! source failing marks only that run as failed; the others finish and the
//! command exits with an error afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use sentinews_core::{AppConfig, NewsSource};
use sentinews_db::{CollectionRunCounts, PgArticleStore};
use sentinews_scraper::{
    run_collection, CancelHandle, CollectionPlan, CollectionReport, Collector, CollectorSettings,
    ReqwestFetcher,
};
use tokio::task::JoinSet;

use crate::fail_run_best_effort;

#[derive(Debug, Clone)]
pub(crate) struct CollectArgs {
    pub sources: Vec<NewsSource>,
    pub candidates: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub pages: Option<u32>,
    pub fetch_bodies: bool,
}

/// Run one collection pass per selected source and persist what they emit.
///
/// # Errors
///
/// Returns an error if no candidate matches the filter, an explicitly
/// requested source has no API key, the HTTP client cannot be built, or any
/// source's run fails.
pub(crate) async fn run_collect(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    args: CollectArgs,
) -> anyhow::Result<()> {
    let sources = select_sources(config, &args.sources)?;
    if sources.is_empty() {
        anyhow::bail!("no sources to collect from");
    }

    let topics = config.candidates.select(&args.candidates).topics();
    if topics.is_empty() {
        anyhow::bail!(
            "no configured candidate matches {:?}",
            args.candidates.join(", ")
        );
    }

    let (start, end) = day_bounds(args.start, args.end);
    let plan = CollectionPlan::new(topics, Utc::now()).with_bounds(start, end);

    let fetcher = ReqwestFetcher::new(config.http_timeout_secs, &config.http_user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    let store = PgArticleStore::new(pool.clone());

    let cancel = CancelHandle::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping after the current page");
                cancel.cancel();
            }
        })
    };

    let mut tasks = JoinSet::new();
    for source in sources {
        let mut settings = CollectorSettings::from_app_config(source, config);
        if let Some(pages) = args.pages {
            settings.page_limit = pages;
        }
        settings.fetch_bodies = args.fetch_bodies;

        let job = SourceJob {
            source,
            collector: Collector::new(fetcher.clone(), settings, config.candidates.clone())
                .with_cancel_handle(cancel.clone()),
            store: store.clone(),
            plan: plan.clone(),
        };
        tasks.spawn(job.run());
    }

    let mut failed: Vec<NewsSource> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((source, Ok(report))) => {
                println!("{report}");
                tracing::debug!(source = %source, "source finished");
            }
            Ok((source, Err(e))) => {
                eprintln!("error: {source} collection failed: {e:#}");
                failed.push(source);
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "collection task panicked");
                anyhow::bail!("collection task panicked: {join_err}");
            }
        }
    }
    interrupt.abort();

    if failed.is_empty() {
        Ok(())
    } else {
        let names: Vec<String> = failed.iter().map(ToString::to_string).collect();
        anyhow::bail!("collection failed for: {}", names.join(", "))
    }
}

struct SourceJob {
    source: NewsSource,
    collector: Collector<ReqwestFetcher>,
    store: PgArticleStore,
    plan: CollectionPlan,
}

impl SourceJob {
    /// create → start → collect → complete/fail for one source.
    async fn run(mut self) -> (NewsSource, anyhow::Result<CollectionReport>) {
        let source = self.source;
        let result = self.run_inner().await;
        (source, result)
    }

    async fn run_inner(&mut self) -> anyhow::Result<CollectionReport> {
        let pool = self.store.pool().clone();
        let run = sentinews_db::create_collection_run(&pool, self.source, "cli").await?;

        if let Err(e) = sentinews_db::start_collection_run(&pool, run.id).await {
            fail_run_best_effort(
                &pool,
                run.id,
                CollectionRunCounts::default(),
                self.source.as_str(),
                format!("{e:#}"),
            )
            .await;
            return Err(e.into());
        }

        match run_collection(&mut self.collector, &self.store, self.plan.clone()).await {
            Ok(report) => {
                sentinews_db::complete_collection_run(&pool, run.id, counts_from_report(&report))
                    .await?;
                Ok(report)
            }
            Err(e) => {
                let partial = counts_from_report(self.collector.report());
                fail_run_best_effort(
                    &pool,
                    run.id,
                    partial,
                    self.source.as_str(),
                    e.to_string(),
                )
                .await;
                Err(e.into())
            }
        }
    }
}

/// Explicit sources are taken as given but must have credentials when the
/// API needs them. With no explicit sources, every source that can run is
/// selected and keyed sources without a key are skipped.
pub(crate) fn select_sources(
    config: &AppConfig,
    requested: &[NewsSource],
) -> anyhow::Result<Vec<NewsSource>> {
    if requested.is_empty() {
        return Ok(NewsSource::ALL
            .into_iter()
            .filter(|source| {
                if has_credentials(config, *source) {
                    true
                } else {
                    tracing::warn!(source = %source, "skipping source: API key is not set");
                    false
                }
            })
            .collect());
    }

    let mut selected = Vec::with_capacity(requested.len());
    for &source in requested {
        if !has_credentials(config, source) {
            anyhow::bail!("{source} requires an API key; set {}", key_var(source));
        }
        if !selected.contains(&source) {
            selected.push(source);
        }
    }
    Ok(selected)
}

fn has_credentials(config: &AppConfig, source: NewsSource) -> bool {
    let key = match source {
        NewsSource::Nyt => config.nyt_api_key.as_deref(),
        NewsSource::NewsApi => config.news_api_key.as_deref(),
        NewsSource::Cnn | NewsSource::Fox => return true,
    };
    key.is_some_and(|k| !k.trim().is_empty())
}

fn key_var(source: NewsSource) -> &'static str {
    match source {
        NewsSource::NewsApi => "NEWS_API_KEY",
        _ => "NYT_API_KEY",
    }
}

/// Widen calendar days to timestamps: `start` from midnight, `end` through
/// the last second of the day.
pub(crate) fn day_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start = start
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc());
    let end = end
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|t| t.and_utc());
    (start, end)
}

pub(crate) fn counts_from_report(report: &CollectionReport) -> CollectionRunCounts {
    let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    CollectionRunCounts {
        fetched: clamp(report.fetched),
        duplicates: clamp(report.duplicates),
        off_topic: clamp(report.off_topic),
        inserted: clamp(report.inserted),
        page_failures: clamp(report.page_failures),
        malformed: clamp(report.malformed),
    }
}

/// Print the most recent collection runs, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_list_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = sentinews_db::list_collection_runs(pool, limit.max(1)).await?;
    if runs.is_empty() {
        println!("no collection runs recorded");
        return Ok(());
    }

    for run in runs {
        let finished = run
            .completed_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        println!(
            "{:>6}  {:<8} {:<9} finished={finished} fetched={} inserted={} duplicates={} off_topic={} malformed={} page_failures={}",
            run.id,
            run.source,
            run.status,
            run.fetched,
            run.inserted,
            run.duplicates,
            run.off_topic,
            run.malformed,
            run.page_failures,
        );
        if let Some(message) = run.error_message {
            println!("        error: {message}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
