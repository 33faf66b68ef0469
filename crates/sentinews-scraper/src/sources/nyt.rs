//! New York Times Article Search API.

use sentinews_core::NewsSource;
use serde::Deserialize;
use serde_json::Value;

use super::envelope_error;
use crate::error::ScraperError;
use crate::normalize::{record_from_parts, Hit, NormalizedPage};

#[derive(Debug, Deserialize)]
struct NytEnvelope {
    response: NytResponse,
}

#[derive(Debug, Deserialize)]
struct NytResponse {
    #[serde(default)]
    docs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct NytDoc {
    web_url: Option<String>,
    pub_date: Option<String>,
    headline: Option<NytHeadline>,
}

#[derive(Debug, Deserialize)]
struct NytHeadline {
    main: Option<String>,
}

pub(super) fn normalize(body: &str) -> Result<NormalizedPage, ScraperError> {
    let envelope: NytEnvelope =
        serde_json::from_str(body).map_err(|e| envelope_error(NewsSource::Nyt, e))?;

    Ok(NormalizedPage::from_hits(
        envelope.response.docs,
        |doc: NytDoc| {
            record_from_parts(
                NewsSource::Nyt,
                doc.web_url,
                doc.pub_date.as_deref(),
                doc.headline.and_then(|h| h.main),
            )
            .map_or(Hit::Malformed, Hit::Keep)
        },
    ))
}
