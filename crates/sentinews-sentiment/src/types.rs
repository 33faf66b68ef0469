use std::path::PathBuf;

use sentinews_core::AppConfig;

/// Where the optional model artifacts live.
#[derive(Debug, Clone, Default)]
pub struct SentimentConfig {
    /// JSON naive Bayes model. When unset, the embedded corpus is used.
    pub naive_bayes_model_path: Option<PathBuf>,
    /// JSON LSTM weights. When unset, the neural analyzer is unavailable.
    pub neural_model_path: Option<PathBuf>,
}

impl SentimentConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            naive_bayes_model_path: config.naive_bayes_model_path.clone(),
            neural_model_path: config.neural_model_path.clone(),
        }
    }
}
