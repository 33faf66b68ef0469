//! Per-source search request construction.
//!
//! [`build_query`] is pure: given the same settings, topic, page, bounds and
//! `now` it always produces the same URL. Date formats differ per source:
//!
//! | Source  | Date params                 | Format                | Paging                         |
//! |---------|-----------------------------|-----------------------|--------------------------------|
//! | NYT     | `begin_date`, `end_date`    | `YYYYMMDD`            | `page=n` (0-based)             |
//! | CNN     | none (window applied later) |                       | `page=n+1`, `from=n*size`      |
//! | Fox     | `min_date`, `max_date`      | `YYYY-MM-DD`          | `start=n*size`                 |
//! | NewsAPI | `from`, `to`                | `YYYY-MM-DDTHH:MM:SS` | `page=n+1`, `pageSize=size`    |

use std::fmt;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sentinews_core::{AppConfig, DateWindow, NewsSource, DEFAULT_WINDOW_DAYS};

use crate::error::ScraperError;

pub const NYT_BASE_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";
pub const CNN_BASE_URL: &str = "https://search.api.cnn.io/content";
pub const FOX_BASE_URL: &str = "https://api.foxnews.com/v1/content/search";
pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Outlets NewsAPI is restricted to unless overridden.
pub const NEWSAPI_DEFAULT_OUTLETS: [&str; 12] = [
    "bbc-news",
    "breitbart-news",
    "cnn",
    "fox-news",
    "politico",
    "reuters",
    "the-hill",
    "the-american-conservative",
    "the-huffington-post",
    "the-new-york-times",
    "the-wall-street-journal",
    "the-washington-post",
];

const FOX_FIELDS: &str = "date,description,title,url,image,type,taxonomy";

/// Where and how to query one source.
#[derive(Clone)]
pub struct SourceSettings {
    pub source: NewsSource,
    pub base_url: String,
    pub api_key: Option<String>,
    pub page_size: u32,
    /// Trailing window used when the caller's bounds are missing or inverted.
    pub default_window_days: i64,
    /// NewsAPI `sources` filter. Ignored by the other sources.
    pub outlets: Vec<String>,
}

impl fmt::Debug for SourceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSettings")
            .field("source", &self.source)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("page_size", &self.page_size)
            .field("default_window_days", &self.default_window_days)
            .field("outlets", &self.outlets)
            .finish()
    }
}

impl SourceSettings {
    /// Production endpoint and page size for `source`.
    #[must_use]
    pub fn new(source: NewsSource, api_key: Option<String>) -> Self {
        let (base_url, page_size) = match source {
            NewsSource::Nyt => (NYT_BASE_URL, 10),
            NewsSource::Cnn => (CNN_BASE_URL, 100),
            NewsSource::Fox => (FOX_BASE_URL, 10),
            NewsSource::NewsApi => (NEWSAPI_BASE_URL, 100),
        };
        let outlets = if source == NewsSource::NewsApi {
            NEWSAPI_DEFAULT_OUTLETS.iter().map(ToString::to_string).collect()
        } else {
            Vec::new()
        };
        Self {
            source,
            base_url: base_url.to_string(),
            api_key,
            page_size,
            default_window_days: DEFAULT_WINDOW_DAYS,
            outlets,
        }
    }

    /// Settings for `source` with the matching API key and window from config.
    #[must_use]
    pub fn from_app_config(source: NewsSource, config: &AppConfig) -> Self {
        let api_key = match source {
            NewsSource::Nyt => config.nyt_api_key.clone(),
            NewsSource::NewsApi => config.news_api_key.clone(),
            NewsSource::Cnn | NewsSource::Fox => None,
        };
        let mut settings = Self::new(source, api_key);
        settings.default_window_days = config.default_window_days;
        settings
    }

    /// Point at a different host, e.g. a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// NYT and NewsAPI reject unauthenticated requests.
    #[must_use]
    pub fn requires_api_key(&self) -> bool {
        matches!(self.source, NewsSource::Nyt | NewsSource::NewsApi)
    }

    fn api_key(&self) -> Result<&str, ScraperError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ScraperError::MissingApiKey(self.source))
    }
}

/// A fully formed search request for one `(topic, page)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub source: NewsSource,
    pub topic: String,
    pub page: u32,
    pub url: String,
    /// Resolved date window. CNN filters on it during normalization.
    pub window: DateWindow,
}

/// Build the request for `topic` at zero-based `page`.
///
/// Missing or inverted bounds (`end < start`) fall back to the trailing
/// `settings.default_window_days` ending at `now` instead of failing.
///
/// # Errors
///
/// Returns [`ScraperError::MissingApiKey`] for NYT and NewsAPI when no key
/// is configured.
pub fn build_query(
    settings: &SourceSettings,
    topic: &str,
    page: u32,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<QueryDescriptor, ScraperError> {
    let window = DateWindow::resolve_with_default(start, end, now, settings.default_window_days);
    let q = encode(topic);
    let base = settings.base_url.trim_end_matches('/');
    let size = settings.page_size.max(1);
    let offset = u64::from(page) * u64::from(size);

    let url = match settings.source {
        NewsSource::Nyt => {
            let key = encode(settings.api_key()?);
            format!(
                "{base}?q={q}&page={page}&begin_date={}&end_date={}&sort=newest&api-key={key}",
                window.start.format("%Y%m%d"),
                window.end.format("%Y%m%d"),
            )
        }
        NewsSource::Cnn => format!(
            "{base}?q={q}&size={size}&type=article&sort=newest&page={}&from={offset}",
            page + 1
        ),
        NewsSource::Fox => format!(
            "{base}?q={q}&fields={FOX_FIELDS}&section.path=fnc&type=article&min_date={}&max_date={}&start={offset}&callback=angular.callbacks._0&cb=112",
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d"),
        ),
        NewsSource::NewsApi => {
            let key = encode(settings.api_key()?);
            let mut url = format!(
                "{base}?q={q}&language=en&from={}&to={}&sortBy=relevancy&page={}&pageSize={size}&apiKey={key}",
                window.start.format("%Y-%m-%dT%H:%M:%S"),
                window.end.format("%Y-%m-%dT%H:%M:%S"),
                page + 1,
            );
            if !settings.outlets.is_empty() {
                url.push_str("&sources=");
                url.push_str(&encode(&settings.outlets.join(",")));
            }
            url
        }
    };

    Ok(QueryDescriptor {
        source: settings.source,
        topic: topic.to_string(),
        page,
        url,
        window,
    })
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
