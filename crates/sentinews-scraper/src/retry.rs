//! Bounded retry with exponential back-off and jitter for page fetches.
//!
//! The default policy retries a failed page once, immediately
//! (`max_retries = 1`, `backoff_base_ms = 0`).

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` for errors that may clear up on a second attempt.
///
/// **Retriable:** transport failures and non-2xx statuses other than 401/403.
///
/// **Not retriable:** [`ScraperError::SourceUnavailable`] (bad credentials,
/// blocked client), malformed payloads, store failures, missing API keys.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => !is_auth_failure(*status),
        ScraperError::Deserialize { .. }
        | ScraperError::SourceUnavailable { .. }
        | ScraperError::MissingApiKey(_)
        | ScraperError::Store(_) => false,
    }
}

/// 401 and 403 mean the source rejected us; no later page will fare better.
pub(crate) fn is_auth_failure(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// retriable errors.
///
/// The n-th retry waits `backoff_base_ms × 2ⁿ⁻¹ ± 25 %`, capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "page fetch failed, retrying"
                );
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}
