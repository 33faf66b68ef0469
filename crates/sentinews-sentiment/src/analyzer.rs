use sentinews_core::{AnalyzerKind, SentimentScore};

use crate::error::SentimentError;
use crate::lexicon::LexiconAnalyzer;
use crate::naive_bayes::NaiveBayesAnalyzer;
use crate::neural::NeuralAnalyzer;
use crate::types::SentimentConfig;

/// Scores a piece of text. Implementations are pure: the same input always
/// yields the same score and nothing outside the analyzer is touched.
pub trait SentimentAnalyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidInput`] for empty or whitespace-only text.
    fn evaluate(&self, text: &str) -> Result<SentimentScore, SentimentError>;
}

#[derive(Debug, Clone)]
pub enum Analyzer {
    Lexicon(LexiconAnalyzer),
    NaiveBayes(NaiveBayesAnalyzer),
    Neural(NeuralAnalyzer),
}

impl SentimentAnalyzer for Analyzer {
    fn kind(&self) -> AnalyzerKind {
        match self {
            Analyzer::Lexicon(_) => AnalyzerKind::Lexicon,
            Analyzer::NaiveBayes(_) => AnalyzerKind::NaiveBayes,
            Analyzer::Neural(_) => AnalyzerKind::Neural,
        }
    }

    fn evaluate(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        match self {
            Analyzer::Lexicon(a) => a.evaluate(text),
            Analyzer::NaiveBayes(a) => a.evaluate(text),
            Analyzer::Neural(a) => a.evaluate(text),
        }
    }
}

/// Build one analyzer.
///
/// # Errors
///
/// Returns [`SentimentError::NotConfigured`] when `kind` is neural and no
/// model path is set, or [`SentimentError::ModelLoad`] when a configured
/// model file cannot be loaded.
pub fn load_analyzer(
    kind: AnalyzerKind,
    config: &SentimentConfig,
) -> Result<Analyzer, SentimentError> {
    match kind {
        AnalyzerKind::Lexicon => Ok(Analyzer::Lexicon(LexiconAnalyzer::new())),
        AnalyzerKind::NaiveBayes => match &config.naive_bayes_model_path {
            Some(path) => NaiveBayesAnalyzer::from_path(path).map(Analyzer::NaiveBayes),
            None => Ok(Analyzer::NaiveBayes(NaiveBayesAnalyzer::with_default_model())),
        },
        AnalyzerKind::Neural => {
            let path = config
                .neural_model_path
                .as_deref()
                .ok_or(SentimentError::NotConfigured(AnalyzerKind::Neural))?;
            NeuralAnalyzer::from_path(path).map(Analyzer::Neural)
        }
    }
}

/// Build every available analyzer. Lexicon and naive Bayes are always
/// present; neural is added only when a model path is configured.
///
/// # Errors
///
/// Returns [`SentimentError::ModelLoad`] if a configured model path is bad.
pub fn load_analyzers(config: &SentimentConfig) -> Result<Vec<Analyzer>, SentimentError> {
    let mut analyzers = vec![
        load_analyzer(AnalyzerKind::Lexicon, config)?,
        load_analyzer(AnalyzerKind::NaiveBayes, config)?,
    ];
    if config.neural_model_path.is_some() {
        analyzers.push(load_analyzer(AnalyzerKind::Neural, config)?);
    }
    tracing::debug!(
        analyzers = ?analyzers.iter().map(SentimentAnalyzer::kind).collect::<Vec<_>>(),
        "sentiment analyzers loaded"
    );
    Ok(analyzers)
}
