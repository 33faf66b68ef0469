//! Per-source search payload decoding.

mod cnn;
mod fox;
mod newsapi;
mod nyt;

use sentinews_core::{DateWindow, NewsSource};

use crate::error::ScraperError;
use crate::normalize::NormalizedPage;

/// Decode one search page from `source` into common records.
///
/// `window` is only consulted for CNN, whose search API has no date
/// parameters.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] if the page envelope itself does
/// not parse. Individual bad hits are counted in
/// [`NormalizedPage::malformed`] instead.
pub fn normalize_page(
    source: NewsSource,
    body: &str,
    window: &DateWindow,
) -> Result<NormalizedPage, ScraperError> {
    match source {
        NewsSource::Nyt => nyt::normalize(body),
        NewsSource::Cnn => cnn::normalize(body, window),
        NewsSource::Fox => fox::normalize(body),
        NewsSource::NewsApi => newsapi::normalize(body),
    }
}

fn envelope_error(source: NewsSource, e: serde_json::Error) -> ScraperError {
    ScraperError::Deserialize {
        context: format!("{source} search page"),
        source: e,
    }
}
