//! The article record: the unit of work flowing from collectors to storage.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::{AnalyzerKind, SentimentScore};
use crate::CoreError;

/// Which upstream API produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewsSource {
    Nyt,
    Cnn,
    Fox,
    #[serde(rename = "NEWSAPI")]
    NewsApi,
}

impl NewsSource {
    pub const ALL: [NewsSource; 4] = [
        NewsSource::Nyt,
        NewsSource::Cnn,
        NewsSource::Fox,
        NewsSource::NewsApi,
    ];

    /// Stable identifier stored in the `articles.source` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NewsSource::Nyt => "NYT",
            NewsSource::Cnn => "CNN",
            NewsSource::Fox => "FOX",
            NewsSource::NewsApi => "NEWSAPI",
        }
    }
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NYT" | "NYTIMES" => Ok(NewsSource::Nyt),
            "CNN" => Ok(NewsSource::Cnn),
            "FOX" | "FOX NEWS" | "FOXNEWS" => Ok(NewsSource::Fox),
            "NEWSAPI" | "NEWS_API" => Ok(NewsSource::NewsApi),
            _ => Err(CoreError::UnknownSource(s.to_string())),
        }
    }
}

/// Per-analyzer sentiment scores. Each slot is either absent (never scored)
/// or a complete [`SentimentScore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleScores {
    pub lexicon: Option<SentimentScore>,
    pub naive_bayes: Option<SentimentScore>,
    pub neural: Option<SentimentScore>,
}

impl ArticleScores {
    #[must_use]
    pub fn get(&self, kind: AnalyzerKind) -> Option<&SentimentScore> {
        match kind {
            AnalyzerKind::Lexicon => self.lexicon.as_ref(),
            AnalyzerKind::NaiveBayes => self.naive_bayes.as_ref(),
            AnalyzerKind::Neural => self.neural.as_ref(),
        }
    }

    /// Replace the slot matching `score.kind`.
    pub fn set(&mut self, score: SentimentScore) {
        let slot = match score.kind {
            AnalyzerKind::Lexicon => &mut self.lexicon,
            AnalyzerKind::NaiveBayes => &mut self.naive_bayes,
            AnalyzerKind::Neural => &mut self.neural,
        };
        *slot = Some(score);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lexicon.is_none() && self.naive_bayes.is_none() && self.neural.is_none()
    }
}

/// A collected news article, keyed by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub source: NewsSource,
    pub body: Option<String>,
    #[serde(default)]
    pub scores: ArticleScores,
}

impl ArticleRecord {
    /// Build an unscored record without a body. `published_at` is cut to
    /// microseconds, the precision Postgres keeps.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        published_at: DateTime<Utc>,
        title: impl Into<String>,
        source: NewsSource,
    ) -> Self {
        Self {
            url: url.into(),
            published_at: published_at.trunc_subsecs(6),
            title: title.into(),
            source,
            body: None,
            scores: ArticleScores::default(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.trim().is_empty() {
            None
        } else {
            Some(body)
        };
        self
    }

    /// Apply an explicit partial update. `url` is never touched.
    pub fn apply(&mut self, update: &ArticleUpdate) {
        if let Some(published_at) = update.published_at {
            self.published_at = published_at.trunc_subsecs(6);
        }
        if let Some(title) = &update.title {
            // Scores are derived from the title and go stale with it.
            if *title != self.title {
                self.scores = ArticleScores::default();
            }
            self.title.clone_from(title);
        }
        if let Some(source) = update.source {
            self.source = source;
        }
        if let Some(body) = &update.body {
            self.body = Some(body.clone());
        }
    }
}

/// A stored article's URL and headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTitle {
    pub url: String,
    pub title: String,
}

/// Explicit correction of article metadata. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub published_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub source: Option<NewsSource>,
    pub body: Option<String>,
}

impl ArticleUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published_at.is_none()
            && self.title.is_none()
            && self.source.is_none()
            && self.body.is_none()
    }
}
