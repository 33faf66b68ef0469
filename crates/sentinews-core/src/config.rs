use crate::app_config::{AppConfig, Environment};
use crate::candidates::CandidateRoster;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load configuration for commands that never open a database pool.
///
/// Same as [`load_app_config_from_env`] except that a missing
/// `DATABASE_URL` is allowed and leaves `database_url` empty.
///
/// # Errors
///
/// Returns `ConfigError` if any other value is invalid.
pub fn load_offline_config_from_env() -> Result<AppConfig, ConfigError> {
    build_offline_config(|key| std::env::var(key))
}

fn build_offline_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    build_app_config(|key| match lookup(key) {
        Err(_) if key == "DATABASE_URL" => Ok(String::new()),
        found => found,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset for optional values.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SENTINEWS_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_as(
        "SENTINEWS_BIND_ADDR",
        &or_default("SENTINEWS_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("SENTINEWS_LOG_LEVEL", "info");

    let candidates = match optional("SENTINEWS_CANDIDATES") {
        Some(raw) => {
            CandidateRoster::parse(&raw).map_err(|reason| ConfigError::InvalidEnvVar {
                var: "SENTINEWS_CANDIDATES".to_string(),
                reason,
            })?
        }
        None => CandidateRoster::default(),
    };

    let nyt_api_key = optional("NYT_API_KEY");
    let news_api_key = optional("NEWS_API_KEY");

    let db_max_connections: u32 = parse_as(
        "SENTINEWS_DB_MAX_CONNECTIONS",
        &or_default("SENTINEWS_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "SENTINEWS_DB_MIN_CONNECTIONS",
        &or_default("SENTINEWS_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "SENTINEWS_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("SENTINEWS_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let http_timeout_secs: u64 = parse_as(
        "SENTINEWS_HTTP_TIMEOUT_SECS",
        &or_default("SENTINEWS_HTTP_TIMEOUT_SECS", "30"),
    )?;
    let http_user_agent = or_default(
        "SENTINEWS_HTTP_USER_AGENT",
        "sentinews/0.1 (news-sentiment)",
    );

    let page_limit: u32 = parse_as(
        "SENTINEWS_PAGE_LIMIT",
        &or_default("SENTINEWS_PAGE_LIMIT", "5"),
    )?;
    let max_retries: u32 = parse_as(
        "SENTINEWS_MAX_RETRIES",
        &or_default("SENTINEWS_MAX_RETRIES", "1"),
    )?;
    let retry_backoff_ms: u64 = parse_as(
        "SENTINEWS_RETRY_BACKOFF_MS",
        &or_default("SENTINEWS_RETRY_BACKOFF_MS", "0"),
    )?;
    let max_consecutive_failures: u32 = parse_as(
        "SENTINEWS_MAX_CONSECUTIVE_FAILURES",
        &or_default("SENTINEWS_MAX_CONSECUTIVE_FAILURES", "3"),
    )?;
    if max_consecutive_failures == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SENTINEWS_MAX_CONSECUTIVE_FAILURES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let default_window_days: i64 = parse_as(
        "SENTINEWS_DEFAULT_WINDOW_DAYS",
        &or_default("SENTINEWS_DEFAULT_WINDOW_DAYS", "7"),
    )?;
    if default_window_days <= 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SENTINEWS_DEFAULT_WINDOW_DAYS".to_string(),
            reason: "must be a positive number of days".to_string(),
        });
    }

    let naive_bayes_model_path = optional("SENTINEWS_NAIVE_BAYES_MODEL_PATH").map(PathBuf::from);
    let neural_model_path = optional("SENTINEWS_NEURAL_MODEL_PATH").map(PathBuf::from);

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        candidates,
        nyt_api_key,
        news_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        page_limit,
        max_retries,
        retry_backoff_ms,
        max_consecutive_failures,
        default_window_days,
        naive_bayes_model_path,
        neural_model_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SENTINEWS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
