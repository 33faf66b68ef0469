//! `article` command handlers.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ArticleCommands {
    /// Print a stored article as JSON
    Show {
        /// Canonical article URL
        url: String,
    },
    /// Remove a stored article
    Delete {
        /// Canonical article URL
        url: String,
    },
}

/// # Errors
///
/// Returns an error if the article is missing (for `show`) or a query fails.
pub(crate) async fn run_article_command(
    pool: &sqlx::PgPool,
    command: ArticleCommands,
) -> anyhow::Result<()> {
    match command {
        ArticleCommands::Show { url } => {
            let row = sentinews_db::get_article(pool, &url)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no article stored for {url}"))?;
            let record = row.into_record()?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        ArticleCommands::Delete { url } => {
            if sentinews_db::delete_article(pool, &url).await? {
                println!("deleted {url}");
            } else {
                println!("no article stored for {url}; nothing deleted");
            }
        }
    }
    Ok(())
}
