use sentinews_core::{NewsSource, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Systemic failure: the whole collector for this source stops.
    #[error("{news_source} is unavailable: {reason}")]
    SourceUnavailable {
        news_source: NewsSource,
        reason: String,
    },

    #[error("no API key configured for {0}")]
    MissingApiKey(NewsSource),

    #[error("article store error: {0}")]
    Store(#[from] StoreError),
}
