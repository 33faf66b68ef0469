//! Multinomial naive Bayes with Laplace smoothing over a bag of words.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use sentinews_core::{AnalyzerKind, SentimentScore};
use serde::{Deserialize, Serialize};

use crate::corpus::TRAINING_CORPUS;
use crate::error::SentimentError;
use crate::tokenize::{require_text, tokenize};

/// Word counts for one class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub documents: u64,
    pub tokens: HashMap<String, u64>,
}

impl ClassCounts {
    fn observe(&mut self, text: &str) {
        self.documents += 1;
        for token in tokenize(text) {
            *self.tokens.entry(token).or_insert(0) += 1;
        }
    }

    fn total_tokens(&self) -> u64 {
        self.tokens.values().sum()
    }
}

/// Serializable model: raw counts per class. Probabilities are derived at
/// scoring time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    pub positive: ClassCounts,
    pub negative: ClassCounts,
}

impl NaiveBayesModel {
    /// Train from `(text, is_positive)` pairs.
    pub fn train<'a>(examples: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut model = Self::default();
        for (text, positive) in examples {
            if positive {
                model.positive.observe(text);
            } else {
                model.negative.observe(text);
            }
        }
        model
    }

    /// Read a JSON model file.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ModelLoad`] if the file cannot be read or
    /// parsed, or if either class has no training documents.
    pub fn load(path: &Path) -> Result<Self, SentimentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SentimentError::model_load(path, e))?;
        let model: Self =
            serde_json::from_str(&raw).map_err(|e| SentimentError::model_load(path, e))?;
        if model.positive.documents == 0 || model.negative.documents == 0 {
            return Err(SentimentError::model_load(
                path,
                "both classes need at least one training document",
            ));
        }
        Ok(model)
    }
}

#[derive(Debug, Clone)]
pub struct NaiveBayesAnalyzer {
    model: NaiveBayesModel,
    vocabulary: usize,
    positive_total: f64,
    negative_total: f64,
}

impl NaiveBayesAnalyzer {
    /// Analyzer trained on the embedded headline corpus.
    #[must_use]
    pub fn with_default_model() -> Self {
        Self::from_model(NaiveBayesModel::train(TRAINING_CORPUS.iter().copied()))
    }

    /// # Errors
    ///
    /// See [`NaiveBayesModel::load`].
    pub fn from_path(path: &Path) -> Result<Self, SentimentError> {
        NaiveBayesModel::load(path).map(Self::from_model)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_model(model: NaiveBayesModel) -> Self {
        let vocabulary = model
            .positive
            .tokens
            .keys()
            .chain(model.negative.tokens.keys())
            .collect::<HashSet<_>>()
            .len();
        let positive_total = model.positive.total_tokens() as f64;
        let negative_total = model.negative.total_tokens() as f64;
        Self {
            model,
            vocabulary,
            positive_total,
            negative_total,
        }
    }

    /// Score `text` as a positive/negative split.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidInput`] for empty or whitespace-only text.
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        let tokens = tokenize(require_text(text)?);

        let documents = (self.model.positive.documents + self.model.negative.documents) as f64;
        let mut log_pos = ((self.model.positive.documents as f64 + 1.0) / (documents + 2.0)).ln();
        let mut log_neg = ((self.model.negative.documents as f64 + 1.0) / (documents + 2.0)).ln();

        let vocabulary = self.vocabulary as f64;
        for token in &tokens {
            let pos = self.model.positive.tokens.get(token).copied();
            let neg = self.model.negative.tokens.get(token).copied();
            // Words never seen in training carry no evidence either way.
            if pos.is_none() && neg.is_none() {
                continue;
            }
            let pos = pos.unwrap_or(0) as f64;
            let neg = neg.unwrap_or(0) as f64;
            log_pos += ((pos + 1.0) / (self.positive_total + vocabulary)).ln();
            log_neg += ((neg + 1.0) / (self.negative_total + vocabulary)).ln();
        }

        // Two-class softmax via log-sum-exp.
        let max = log_pos.max(log_neg);
        let e_pos = (log_pos - max).exp();
        let e_neg = (log_neg - max).exp();
        let p_positive = e_pos / (e_pos + e_neg);

        Ok(SentimentScore::two_class(
            AnalyzerKind::NaiveBayes,
            p_positive,
            1.0 - p_positive,
        ))
    }
}

impl Default for NaiveBayesAnalyzer {
    fn default() -> Self {
        Self::with_default_model()
    }
}
