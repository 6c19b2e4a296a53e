use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchHitResponse {
    pub rank: usize,
    pub source_id: String,
    pub title: String,
    pub content: String,
    pub score: f32,
}

/// Raw retrieval without asking the model.
pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHitResponse>>, ApiError> {
    let retrieval = state.recommendation.retrieval();
    let top_k = request.limit.unwrap_or_else(|| retrieval.default_top_k());

    let result = retrieval.retrieve_top_k(&request.query, top_k).await?;

    Ok(Json(
        result
            .documents
            .into_iter()
            .map(|d| SearchHitResponse {
                rank: d.rank,
                source_id: d.document.metadata.source_id,
                title: d.document.metadata.title,
                content: d.document.text,
                score: d.score,
            })
            .collect(),
    ))
}
