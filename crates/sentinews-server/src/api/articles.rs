use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sentinews_core::{
    AnalyzerKind, ArticleRecord, ArticleStore, ArticleTitle, ArticleUpdate, NewsSource,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct UnscoredQuery {
    pub unscored: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleQuery {
    pub url: Option<String>,
}

/// Body accepted by `POST /article`. Scores are never accepted from clients.
#[derive(Debug, Deserialize)]
pub(super) struct NewArticle {
    url: String,
    published_at: DateTime<Utc>,
    title: String,
    source: NewsSource,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedArticle {
    url: String,
    deleted: bool,
}

fn require_url(req_id: &RequestId, url: Option<String>) -> Result<String, ApiError> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "query parameter 'url' is required",
            )
        })
}

fn json_error(req_id: &RequestId, rejection: &JsonRejection) -> ApiError {
    ApiError::new(req_id.0.clone(), "validation_error", rejection.body_text())
}

pub(super) async fn list_unscored<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UnscoredQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleRecord>>>, ApiError> {
    let raw = query.unscored.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "query parameter 'unscored' is required",
        )
    })?;
    let kind: AnalyzerKind = raw
        .parse()
        .map_err(|e: sentinews_core::CoreError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let data = state
        .store
        .list_unscored(kind, Some(normalize_limit(query.limit)))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Every stored URL with its title, oldest first.
pub(super) async fn list_urls<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ArticleTitle>>>, ApiError> {
    let data = state
        .store
        .list_titles()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_article<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<ApiResponse<ArticleRecord>>, ApiError> {
    let url = require_url(&req_id, query.url)?;
    let record = state
        .store
        .find(&url)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no article stored for {url}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_article<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<NewArticle>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleRecord>>), ApiError> {
    let Json(new) = payload.map_err(|e| json_error(&req_id, &e))?;
    let url = require_url(&req_id, Some(new.url))?;
    if new.title.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "title must not be empty",
        ));
    }

    let mut record = ArticleRecord::new(url, new.published_at, new.title, new.source);
    if let Some(body) = new.body {
        record = record.with_body(body);
    }

    let inserted = state
        .store
        .insert(&record)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    if !inserted {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            format!("an article is already stored for {}", record.url),
        ));
    }

    tracing::info!(url = %record.url, source = %record.source, "article created via api");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: record,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update_article<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ArticleQuery>,
    payload: Result<Json<ArticleUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<ArticleRecord>>, ApiError> {
    let url = require_url(&req_id, query.url)?;
    let Json(update) = payload.map_err(|e| json_error(&req_id, &e))?;
    if update.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "update must change at least one field",
        ));
    }

    let record = state
        .store
        .update_article(&url, &update)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `200` with the deleted URL, or `204` when nothing was stored under it.
pub(super) async fn delete_article<S: ArticleStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ArticleQuery>,
) -> Result<Response, ApiError> {
    let url = require_url(&req_id, query.url)?;
    let deleted = state
        .store
        .delete(&url)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    if !deleted {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    tracing::info!(url = %url, "article deleted via api");
    Ok(Json(ApiResponse {
        data: DeletedArticle { url, deleted },
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response())
}
