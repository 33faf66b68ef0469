mod article;
mod collect;
mod sentiment;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use sentinews_core::{AnalyzerKind, NewsSource};
use tracing_subscriber::EnvFilter;

use crate::article::ArticleCommands;

#[derive(Debug, Parser)]
#[command(name = "sentinews-cli")]
#[command(about = "Collect presidential campaign coverage and score headline sentiment")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Collect articles from the news search APIs
    Collect {
        /// Source to collect from (repeatable; defaults to every source with credentials)
        #[arg(long = "source")]
        sources: Vec<NewsSource>,

        /// Candidate to query for, by full or last name (repeatable; defaults to all)
        #[arg(long = "candidate")]
        candidates: Vec<String>,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Pages to request per candidate (overrides `SENTINEWS_PAGE_LIMIT`)
        #[arg(long)]
        pages: Option<u32>,

        /// Fetch article pages to fill in missing bodies
        #[arg(long)]
        fetch_bodies: bool,
    },
    /// Score stored articles that are missing sentiment scores
    Backfill {
        /// Analyzer to run (repeatable; defaults to every configured analyzer)
        #[arg(long = "analyzer")]
        analyzers: Vec<AnalyzerKind>,

        /// Maximum records to score per analyzer
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Score a piece of text without touching the database
    Score {
        text: String,

        /// Restrict scoring to one analyzer
        #[arg(long)]
        analyzer: Option<AnalyzerKind>,
    },
    /// Inspect or remove a stored article
    Article {
        #[command(subcommand)]
        command: ArticleCommands,
    },
    /// Show recent collection runs
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Run pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = if needs_database(&command) {
        sentinews_core::load_app_config_from_env()?
    } else {
        sentinews_core::load_offline_config_from_env()?
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Commands::Score { text, analyzer } = &command {
        return sentiment::run_score(&config, text, *analyzer);
    }

    let pool = sentinews_db::connect_pool(
        &config.database_url,
        sentinews_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                sentinews_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = sentinews_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Collect {
            sources,
            candidates,
            start,
            end,
            pages,
            fetch_bodies,
        } => {
            let args = collect::CollectArgs {
                sources,
                candidates,
                start,
                end,
                pages,
                fetch_bodies,
            };
            collect::run_collect(&pool, &config, args).await?;
        }
        Commands::Backfill { analyzers, limit } => {
            sentiment::run_backfill_command(&pool, &config, &analyzers, limit).await?;
        }
        Commands::Score { .. } => {}
        Commands::Article { command } => article::run_article_command(&pool, command).await?,
        Commands::Runs { limit } => collect::run_list_runs(&pool, limit).await?,
    }

    Ok(())
}

/// Whether `command` opens a database pool. Only those require `DATABASE_URL`.
fn needs_database(command: &Commands) -> bool {
    !matches!(command, Commands::Score { .. })
}

/// Mark a run as failed, logging rather than propagating if that write fails.
async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    counts: sentinews_db::CollectionRunCounts,
    context: &str,
    message: String,
) {
    if let Err(mark_err) =
        sentinews_db::fail_collection_run(pool, run_id, counts, &message).await
    {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark {context} run as failed"
        );
    }
}
