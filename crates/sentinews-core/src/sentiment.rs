//! Sentiment score shape shared by every analyzer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Allowed drift when checking that a classification set sums to 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// The analyzer family that produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerKind {
    Lexicon,
    NaiveBayes,
    Neural,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 3] = [
        AnalyzerKind::Lexicon,
        AnalyzerKind::NaiveBayes,
        AnalyzerKind::Neural,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalyzerKind::Lexicon => "lexicon",
            AnalyzerKind::NaiveBayes => "naive-bayes",
            AnalyzerKind::Neural => "neural",
        }
    }

    /// Whether this analyzer reports a neutral class.
    #[must_use]
    pub fn has_neutral(self) -> bool {
        !matches!(self, AnalyzerKind::NaiveBayes)
    }

    /// Whether this analyzer reports a compound aggregate.
    #[must_use]
    pub fn has_compound(self) -> bool {
        matches!(self, AnalyzerKind::Lexicon)
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" | "vader" => Ok(AnalyzerKind::Lexicon),
            "naive-bayes" | "naive_bayes" | "naivebayes" | "textblob" => {
                Ok(AnalyzerKind::NaiveBayes)
            }
            "neural" | "lstm" => Ok(AnalyzerKind::Neural),
            _ => Err(CoreError::UnknownAnalyzer(s.to_string())),
        }
    }
}

/// One analyzer's verdict on a piece of text.
///
/// Two-class analyzers leave `p_neutral` empty and their two probabilities
/// sum to 1; three-class analyzers sum all three. `compound` in `[-1, 1]`
/// is only reported by the lexicon analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub kind: AnalyzerKind,
    pub p_positive: f64,
    pub p_negative: f64,
    pub p_neutral: Option<f64>,
    pub compound: Option<f64>,
}

impl SentimentScore {
    #[must_use]
    pub fn two_class(kind: AnalyzerKind, p_positive: f64, p_negative: f64) -> Self {
        Self {
            kind,
            p_positive,
            p_negative,
            p_neutral: None,
            compound: None,
        }
    }

    #[must_use]
    pub fn three_class(kind: AnalyzerKind, p_positive: f64, p_negative: f64, p_neutral: f64) -> Self {
        Self {
            kind,
            p_positive,
            p_negative,
            p_neutral: Some(p_neutral),
            compound: None,
        }
    }

    #[must_use]
    pub fn with_compound(mut self, compound: f64) -> Self {
        self.compound = Some(compound);
        self
    }

    /// Sum of the classification probabilities.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.p_positive + self.p_negative + self.p_neutral.unwrap_or(0.0)
    }

    /// Check ranges, the summation invariant, and that the optional fields
    /// match what this analyzer kind reports.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScore`] describing the first violation.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidScore {
            kind: self.kind,
            reason,
        };

        let probabilities = [
            ("p_positive", Some(self.p_positive)),
            ("p_negative", Some(self.p_negative)),
            ("p_neutral", self.p_neutral),
        ];
        for (name, value) in probabilities {
            if let Some(p) = value {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(invalid(format!("{name} = {p} is outside [0, 1]")));
                }
            }
        }

        if self.kind.has_neutral() != self.p_neutral.is_some() {
            return Err(invalid(format!(
                "p_neutral presence does not match the {} class count",
                if self.kind.has_neutral() { "three" } else { "two" }
            )));
        }

        match (self.kind.has_compound(), self.compound) {
            (true, Some(c)) if !c.is_finite() || !(-1.0..=1.0).contains(&c) => {
                return Err(invalid(format!("compound = {c} is outside [-1, 1]")));
            }
            (true, None) => return Err(invalid("compound is missing".to_string())),
            (false, Some(_)) => {
                return Err(invalid("compound is only reported by lexicon".to_string()));
            }
            _ => {}
        }

        let total = self.total();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(format!("probabilities sum to {total}, expected 1")));
        }

        Ok(())
    }
}
