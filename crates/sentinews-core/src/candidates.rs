//! Candidate roster and the on-topic title filter.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CANDIDATES: [&str; 6] = [
    "Donald Trump",
    "Joe Biden",
    "Bernie Sanders",
    "Elizabeth Warren",
    "Kamala Harris",
    "Pete Buttigieg",
];

/// A tracked candidate. `name` is sent to the search APIs as the query
/// topic; `key` is the lower-cased last name matched against titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub key: String,
}

impl Candidate {
    /// Returns `None` for a blank name.
    #[must_use]
    pub fn new(name: &str) -> Option<Self> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        let key = name.split(' ').next_back()?.to_lowercase();
        if key.is_empty() {
            return None;
        }
        Some(Self { name, key })
    }
}

/// Outcome of matching a title against the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateMatch<'a> {
    None,
    One(&'a Candidate),
    Many(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRoster {
    candidates: Vec<Candidate>,
}

impl CandidateRoster {
    /// Parse a comma-separated list of full names.
    ///
    /// # Errors
    ///
    /// Returns a message when the list contains no usable names.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let candidates: Vec<Candidate> = raw.split(',').filter_map(Candidate::new).collect();
        if candidates.is_empty() {
            return Err("no candidate names found".to_string());
        }
        Ok(Self { candidates })
    }

    #[must_use]
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Full names, in roster order, for use as query topics.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.name.clone()).collect()
    }

    /// Keep only candidates whose name or key matches one of `filters`
    /// (case-insensitive). An empty filter list keeps the whole roster.
    #[must_use]
    pub fn select(&self, filters: &[String]) -> Self {
        if filters.is_empty() {
            return self.clone();
        }
        let wanted: Vec<String> = filters.iter().map(|f| f.trim().to_lowercase()).collect();
        let candidates = self
            .candidates
            .iter()
            .filter(|c| {
                wanted
                    .iter()
                    .any(|w| *w == c.key || *w == c.name.to_lowercase())
            })
            .cloned()
            .collect();
        Self { candidates }
    }

    #[must_use]
    pub fn match_title(&self, title: &str) -> CandidateMatch<'_> {
        let lowered = title.to_lowercase();
        let mut hits = self.candidates.iter().filter(|c| lowered.contains(&c.key));
        match (hits.next(), hits.count()) {
            (None, _) => CandidateMatch::None,
            (Some(one), 0) => CandidateMatch::One(one),
            (Some(_), rest) => CandidateMatch::Many(rest + 1),
        }
    }

    /// A title is on topic when it names exactly one candidate.
    #[must_use]
    pub fn is_on_topic(&self, title: &str) -> bool {
        matches!(self.match_title(title), CandidateMatch::One(_))
    }
}

impl Default for CandidateRoster {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES
                .iter()
                .filter_map(|name| Candidate::new(name))
                .collect(),
        }
    }
}
