pub mod health;
pub mod recommend;
pub mod search;

use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{middleware::request_logger, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/recommend", post(recommend::recommend_handler))
        .route("/recommend/", post(recommend::recommend_handler))
        .route("/search", post(search::search_handler))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::application::IngestionService;
    use crate::domain::{ports::VectorIndex, DomainError};
    use crate::infrastructure::{
        AppConfig, InMemoryRecordStore, InMemoryVectorIndex, ServiceContext,
    };
    use crate::testing::{sample_records, HashingEmbedding, ScriptedLlm, UnreachableIndex};

    async fn app_with(index: Arc<dyn VectorIndex>, llm: Arc<ScriptedLlm>, seed: bool) -> Router {
        let mut config = AppConfig::default();
        config.config.retry.max_attempts = 1;
        let embedding = Arc::new(HashingEmbedding::new(256));

        if seed {
            IngestionService::new(
                Arc::new(InMemoryRecordStore::new(sample_records())),
                embedding.clone(),
                index.clone(),
            )
            .ingest()
            .await
            .unwrap();
        }

        let context = ServiceContext::from_parts(config, embedding, index, llm);
        create_router(AppState::from_context(&context))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_root_is_online() {
        let app = app_with(
            Arc::new(InMemoryVectorIndex::new()),
            Arc::new(ScriptedLlm::new(Vec::new())),
            false,
        )
        .await;

        let (status, body) = send(app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "connection online");
    }

    #[tokio::test]
    async fn test_recommend_returns_composer_text() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("Bakery 2\ntotal: 72, taste: 80".to_string()),
            Ok("Buttery, like your soul.".to_string()),
        ]));
        let app = app_with(Arc::new(InMemoryVectorIndex::new()), llm, true).await;

        let (status, body) = send(
            app,
            "POST",
            "/recommend/?prompt=buttery%20flaky%20croissant&k=3",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "buttery flaky croissant");
        assert_eq!(body["recommendation"], "Bakery 2\ntotal: 72, taste: 80");
        assert_eq!(body["explanation"], "Buttery, like your soul.");
        assert_eq!(body["candidates"].as_array().unwrap().len(), 3);
        assert_eq!(body["candidates"][0]["source_id"], "bakery-2");
        assert_eq!(body["bakeries"][0]["title"], "Bakery 2");
    }

    #[tokio::test]
    async fn test_recommend_requires_prompt() {
        let app = app_with(
            Arc::new(InMemoryVectorIndex::new()),
            Arc::new(ScriptedLlm::new(Vec::new())),
            false,
        )
        .await;

        let (status, _) = send(app, "POST", "/recommend/", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommend_blank_prompt_is_bad_request() {
        let app = app_with(
            Arc::new(InMemoryVectorIndex::new()),
            Arc::new(ScriptedLlm::new(Vec::new())),
            false,
        )
        .await;

        let (status, body) = send(app, "POST", "/recommend/?prompt=%20", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("query"));
    }

    #[tokio::test]
    async fn test_unreachable_index_is_503() {
        let app = app_with(
            Arc::new(UnreachableIndex),
            Arc::new(ScriptedLlm::new(Vec::new())),
            false,
        )
        .await;

        let (status, body) = send(app.clone(), "POST", "/recommend/?prompt=cozy", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());

        let (status, body) = send(app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not_ready");
    }

    #[tokio::test]
    async fn test_llm_failure_is_502() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(DomainError::external("boom"))]));
        let app = app_with(Arc::new(InMemoryVectorIndex::new()), llm, true).await;

        let (status, body) = send(app, "POST", "/recommend/?prompt=cozy", None).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("Composer failure"));
    }

    #[tokio::test]
    async fn test_search_and_ready() {
        let app = app_with(
            Arc::new(InMemoryVectorIndex::new()),
            Arc::new(ScriptedLlm::new(Vec::new())),
            true,
        )
        .await;

        let (status, body) = send(
            app.clone(),
            "POST",
            "/search",
            Some(serde_json::json!({ "query": "pastel macaron", "limit": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["source_id"], "bakery-6");
        assert_eq!(hits[0]["rank"], 1);

        let (status, body) = send(app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"], 10);
    }
}
