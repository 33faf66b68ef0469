//! Shared domain types, configuration, and the article storage seam.

pub mod app_config;
pub mod article;
pub mod candidates;
pub mod config;
pub mod sentiment;
pub mod store;
pub mod window;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use article::{ArticleRecord, ArticleScores, ArticleTitle, ArticleUpdate, NewsSource};
pub use candidates::{Candidate, CandidateMatch, CandidateRoster};
pub use config::{load_app_config, load_app_config_from_env, load_offline_config_from_env};
pub use sentiment::{AnalyzerKind, SentimentScore, PROBABILITY_TOLERANCE};
pub use store::{ArticleStore, MemoryArticleStore, StoreError};
pub use window::{DateWindow, DEFAULT_WINDOW_DAYS};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown news source: {0}")]
    UnknownSource(String),

    #[error("unknown analyzer kind: {0}")]
    UnknownAnalyzer(String),

    #[error("invalid {kind} score: {reason}")]
    InvalidScore { kind: AnalyzerKind, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
