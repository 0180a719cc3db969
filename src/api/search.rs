use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use corralon_backend::models::CatalogItem;
use corralon_backend::search::clamp_limit;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub items: Vec<CatalogItem>,
}

/// GET /search?q=<text>&limit=<n>
///
/// `limit` is clamped to [1, 500] with a default of 50. An empty or missing
/// `q` answers `{"items": []}` without touching the engine. Engine failures
/// (store unreachable) surface as a 500 with an error body; partial cascade
/// failures degrade silently inside the engine instead.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let q = params.q.unwrap_or_default();
    let limit = clamp_limit(params.limit);

    if q.trim().is_empty() {
        return Json(SearchResponse { items: Vec::new() }).into_response();
    }

    match state.search.search(&q, limit).await {
        Ok(items) => Json(SearchResponse { items }).into_response(),
        Err(error) => {
            tracing::error!("catalog search failed for {:?}: {}", q, error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/catalog/stats
pub async fn catalog_stats(State(state): State<Arc<AppState>>) -> Response {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM catalog_items")
        .fetch_one(&state.db)
        .await
    {
        Ok(count) => Json(json!({
            "items": count,
            "as_of": chrono::Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(error) => {
            tracing::error!("catalog stats query failed: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}
