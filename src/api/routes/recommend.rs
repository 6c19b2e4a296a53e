use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{Candidate, Recommendation, RecommendedBakery};

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub prompt: String,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub id: Uuid,
    pub query: String,
    pub recommendation: String,
    pub explanation: Option<String>,
    pub bakeries: Vec<RecommendedBakery>,
    pub parse_error: Option<String>,
    pub candidates: Vec<Candidate>,
    pub created_at: DateTime<Utc>,
}

impl From<Recommendation> for RecommendResponse {
    fn from(rec: Recommendation) -> Self {
        Self {
            id: rec.id,
            query: rec.query,
            recommendation: rec.text,
            explanation: rec.explanation,
            bakeries: rec.bakeries,
            parse_error: rec.parse_error,
            candidates: rec.candidates,
            created_at: rec.created_at,
        }
    }
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let service = &state.recommendation;
    let k = params
        .k
        .unwrap_or_else(|| service.retrieval().default_top_k());

    let recommendation = service.recommend(&params.prompt, k).await?;
    Ok(Json(RecommendResponse::from(recommendation)))
}
