use std::path::PathBuf;

use sentinews_core::{AnalyzerKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("cannot score empty text")]
    InvalidInput,

    #[error("failed to load model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("{0} analyzer has no model configured")]
    NotConfigured(AnalyzerKind),

    #[error("{kind} analyzer produced an invalid score: {reason}")]
    InvalidOutput { kind: AnalyzerKind, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SentimentError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
