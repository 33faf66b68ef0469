//! CNN site search API. Hits carry the full article body.

use sentinews_core::{DateWindow, NewsSource};
use serde::Deserialize;
use serde_json::Value;

use super::envelope_error;
use crate::error::ScraperError;
use crate::normalize::{record_from_parts, Hit, NormalizedPage};

#[derive(Debug, Deserialize)]
struct CnnEnvelope {
    #[serde(default)]
    result: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CnnHit {
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
    first_publish_date: Option<String>,
    headline: Option<String>,
    body: Option<String>,
}

pub(super) fn normalize(body: &str, window: &DateWindow) -> Result<NormalizedPage, ScraperError> {
    let envelope: CnnEnvelope =
        serde_json::from_str(body).map_err(|e| envelope_error(NewsSource::Cnn, e))?;

    Ok(NormalizedPage::from_hits(envelope.result, |hit: CnnHit| {
        if hit.kind.as_deref() != Some("article") {
            return Hit::Skip;
        }
        let Some(record) = record_from_parts(
            NewsSource::Cnn,
            hit.url,
            hit.first_publish_date.as_deref(),
            hit.headline,
        ) else {
            return Hit::Malformed;
        };
        if !window.contains(record.published_at) {
            return Hit::Skip;
        }
        match hit.body {
            Some(text) => Hit::Keep(record.with_body(text)),
            None => Hit::Keep(record),
        }
    }))
}
