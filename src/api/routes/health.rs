use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub vector_index: String,
    pub documents: Option<usize>,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "connection online".into(),
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match state.recommendation.retrieval().index().count().await {
        Ok(documents) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".into(),
                vector_index: "connected".into(),
                documents: Some(documents),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "vector index not reachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready".into(),
                    vector_index: "disconnected".into(),
                    documents: None,
                }),
            )
        }
    }
}
