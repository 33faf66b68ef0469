//! Shared helpers for mapping source payloads into [`ArticleRecord`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sentinews_core::{ArticleRecord, NewsSource};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outcome of mapping one search hit.
#[derive(Debug)]
pub(crate) enum Hit {
    Keep(ArticleRecord),
    /// Well-formed but not wanted here (non-article type, outside the window).
    Skip,
    /// Missing URL, title or a parseable timestamp.
    Malformed,
}

/// One page of search results in the common record shape.
#[derive(Debug, Default)]
pub struct NormalizedPage {
    /// Raw hits in the payload. Zero means the source has nothing more for
    /// this topic.
    pub hits: usize,
    pub articles: Vec<ArticleRecord>,
    pub skipped: usize,
    pub malformed: usize,
}

impl NormalizedPage {
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.hits == 0
    }

    /// Decode each raw hit as `T` independently, so one bad entry never
    /// spoils the rest of the page.
    pub(crate) fn from_hits<T, F>(raw: Vec<Value>, mut map: F) -> Self
    where
        T: DeserializeOwned,
        F: FnMut(T) -> Hit,
    {
        let mut page = Self {
            hits: raw.len(),
            ..Self::default()
        };
        for value in raw {
            let hit = match serde_json::from_value::<T>(value) {
                Ok(item) => map(item),
                Err(e) => {
                    tracing::debug!(error = %e, "undecodable search hit");
                    Hit::Malformed
                }
            };
            match hit {
                Hit::Keep(record) => page.articles.push(record),
                Hit::Skip => page.skipped += 1,
                Hit::Malformed => page.malformed += 1,
            }
        }
        page
    }
}

/// Parse the timestamp shapes the news APIs emit.
///
/// Accepts RFC 3339 (`2020-01-15T21:40:36.000Z`), NYT's offset without a
/// colon (`2020-01-01T12:00:00+0000`), naive date-times (taken as UTC) and
/// bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Build a record from its required parts. `None` if any is missing or the
/// timestamp does not parse.
pub(crate) fn record_from_parts(
    source: NewsSource,
    url: Option<String>,
    published: Option<&str>,
    title: Option<String>,
) -> Option<ArticleRecord> {
    let url = non_blank(url)?;
    let title = non_blank(title)?;
    let published_at = published.and_then(parse_timestamp)?;
    Some(ArticleRecord::new(url, published_at, title, source))
}
