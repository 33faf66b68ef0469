//! Fox News content search API. Responses are JSONP-wrapped.

use regex::Regex;
use sentinews_core::NewsSource;
use serde::Deserialize;
use serde_json::Value;

use super::envelope_error;
use crate::error::ScraperError;
use crate::normalize::{record_from_parts, Hit, NormalizedPage};

#[derive(Debug, Deserialize)]
struct FoxEnvelope {
    response: FoxResponse,
}

#[derive(Debug, Deserialize)]
struct FoxResponse {
    #[serde(default)]
    docs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FoxUrl {
    One(String),
    Many(Vec<String>),
}

impl FoxUrl {
    fn first(self) -> Option<String> {
        match self {
            FoxUrl::One(url) => Some(url),
            FoxUrl::Many(urls) => urls.into_iter().next(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FoxDoc {
    date: Option<String>,
    title: Option<String>,
    url: Option<FoxUrl>,
}

/// Strip an `angular.callbacks._0( ... );` wrapper. Plain JSON passes through.
fn unwrap_jsonp(body: &str) -> &str {
    let re = Regex::new(r"(?s)^\s*[A-Za-z_$][\w$.]*\s*\((.*)\)\s*;?\s*$")
        .expect("valid jsonp regex");
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map_or(body, |m| m.as_str())
}

pub(super) fn normalize(body: &str) -> Result<NormalizedPage, ScraperError> {
    let envelope: FoxEnvelope = serde_json::from_str(unwrap_jsonp(body))
        .map_err(|e| envelope_error(NewsSource::Fox, e))?;

    Ok(NormalizedPage::from_hits(
        envelope.response.docs,
        |doc: FoxDoc| {
            record_from_parts(
                NewsSource::Fox,
                doc.url.and_then(FoxUrl::first),
                doc.date.as_deref(),
                doc.title,
            )
            .map_or(Hit::Malformed, Hit::Keep)
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"angular.callbacks._0({"response":{"numFound":2,"docs":[
        {"date":"2020-02-04T18:03:00Z","title":"Buttigieg claims Iowa lead","url":["https://www.foxnews.com/politics/buttigieg-iowa"]},
        {"date":"2020-02-04T19:00:00Z","title":"No url here","url":[]}
    ]}});"#;

    #[test]
    fn unwraps_jsonp_callback() {
        assert_eq!(unwrap_jsonp("cb({\"a\":1});"), "{\"a\":1}");
        assert_eq!(unwrap_jsonp("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn maps_docs_and_takes_first_url() {
        let page = normalize(PAGE).unwrap();
        assert_eq!(page.hits, 2);
        assert_eq!(page.malformed, 1);
        assert_eq!(
            page.articles[0].url,
            "https://www.foxnews.com/politics/buttigieg-iowa"
        );
        assert_eq!(page.articles[0].source, NewsSource::Fox);
    }

    #[test]
    fn accepts_a_bare_url_string() {
        let body = r#"{"response":{"docs":[{"date":"2020-02-04","title":"Trump rally","url":"https://www.foxnews.com/a"}]}}"#;
        let page = normalize(body).unwrap();
        assert_eq!(page.articles.len(), 1);
    }

    #[test]
    fn truncated_payload_is_a_deserialize_error() {
        assert!(matches!(
            normalize("angular.callbacks._0({\"response\":"),
            Err(ScraperError::Deserialize { .. })
        ));
    }
}
