use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use sentinews_core::{AnalyzerKind, ArticleStore, SentimentScore};
use sentinews_sentiment::{SentimentAnalyzer, SentimentError};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    title: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeResult {
    title: String,
    scores: Vec<SentimentScore>,
}

/// Score a title with one analyzer, or with every loaded analyzer when
/// `model` is `all`.
pub(super) async fn analyze_title<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Path(model): Path<String>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalyzeResult>>, ApiError> {
    let Json(request) = payload
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let selected: Vec<_> = if model.eq_ignore_ascii_case("all") {
        state.analyzers.iter().collect()
    } else {
        let kind: AnalyzerKind = model.parse().map_err(|e: sentinews_core::CoreError| {
            ApiError::new(req_id.0.clone(), "not_found", e.to_string())
        })?;
        let analyzer = state
            .analyzers
            .iter()
            .find(|a| a.kind() == kind)
            .ok_or_else(|| {
                ApiError::new(
                    req_id.0.clone(),
                    "not_found",
                    SentimentError::NotConfigured(kind).to_string(),
                )
            })?;
        vec![analyzer]
    };

    let mut scores = Vec::with_capacity(selected.len());
    for analyzer in selected {
        let score = analyzer.evaluate(&request.title).map_err(|e| match e {
            SentimentError::InvalidInput => {
                ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
            }
            other => {
                tracing::error!(analyzer = %analyzer.kind(), error = %other, "analyzer failed");
                ApiError::new(req_id.0.clone(), "internal_error", "analyzer failed")
            }
        })?;
        scores.push(score);
    }

    Ok(Json(ApiResponse {
        data: AnalyzeResult {
            title: request.title,
            scores,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
