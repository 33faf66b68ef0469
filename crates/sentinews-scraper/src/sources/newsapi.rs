//! NewsAPI `/v2/everything`.

use sentinews_core::NewsSource;
use serde::Deserialize;
use serde_json::Value;

use super::envelope_error;
use crate::error::ScraperError;
use crate::normalize::{record_from_parts, Hit, NormalizedPage};

#[derive(Debug, Deserialize)]
struct NewsApiEnvelope {
    #[serde(default)]
    articles: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    url: Option<String>,
    published_at: Option<String>,
    title: Option<String>,
    content: Option<String>,
}

pub(super) fn normalize(body: &str) -> Result<NormalizedPage, ScraperError> {
    let envelope: NewsApiEnvelope =
        serde_json::from_str(body).map_err(|e| envelope_error(NewsSource::NewsApi, e))?;

    Ok(NormalizedPage::from_hits(
        envelope.articles,
        |article: NewsApiArticle| {
            let Some(record) = record_from_parts(
                NewsSource::NewsApi,
                article.url,
                article.published_at.as_deref(),
                article.title,
            ) else {
                return Hit::Malformed;
            };
            match article.content {
                Some(text) => Hit::Keep(record.with_body(text)),
                None => Hit::Keep(record),
            }
        },
    ))
}
