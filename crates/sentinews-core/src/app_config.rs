use std::net::SocketAddr;
use std::path::PathBuf;

use crate::candidates::CandidateRoster;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub candidates: CandidateRoster,
    pub nyt_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub page_limit: u32,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_consecutive_failures: u32,
    pub default_window_days: i64,
    pub naive_bayes_model_path: Option<PathBuf>,
    pub neural_model_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("candidates", &self.candidates)
            .field("database_url", &"[redacted]")
            .field("nyt_api_key", &self.nyt_api_key.as_ref().map(|_| "[redacted]"))
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("page_limit", &self.page_limit)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("max_consecutive_failures", &self.max_consecutive_failures)
            .field("default_window_days", &self.default_window_days)
            .field("naive_bayes_model_path", &self.naive_bayes_model_path)
            .field("neural_model_path", &self.neural_model_path)
            .finish()
    }
}
