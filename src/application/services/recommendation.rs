use std::sync::Arc;
use tracing::instrument;

use crate::application::{RecommendationComposer, RetrievalService};
use crate::domain::{Candidate, DomainError, Recommendation};

/// Entry point for a recommendation request: retrieve, compose, parse.
///
/// Built once at startup and shared by all requests.
pub struct RecommendationService {
    retrieval: Arc<RetrievalService>,
    composer: RecommendationComposer,
}

impl RecommendationService {
    pub fn new(retrieval: Arc<RetrievalService>, composer: RecommendationComposer) -> Self {
        Self {
            retrieval,
            composer,
        }
    }

    pub fn retrieval(&self) -> &Arc<RetrievalService> {
        &self.retrieval
    }

    #[instrument(skip(self))]
    pub async fn recommend(&self, query: &str, k: usize) -> Result<Recommendation, DomainError> {
        let retrieval = self.retrieval.retrieve_top_k(query, k).await?;
        let composition = self.composer.compose(&retrieval.query, &retrieval).await?;

        let candidates = retrieval.documents.iter().map(Candidate::from).collect();
        let mut recommendation =
            Recommendation::new(&retrieval.query, composition.text).with_candidates(candidates);
        if let Some(explanation) = composition.explanation {
            recommendation = recommendation.with_explanation(explanation);
        }

        if !composition.consulted_model {
            return Ok(recommendation);
        }

        let recommendation = recommendation.parsed();
        if let Some(reason) = &recommendation.parse_error {
            tracing::warn!(reason = %reason, "model answer did not follow the requested format");
        }
        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{IngestionService, Prompts, RetryPolicy};
    use crate::infrastructure::{InMemoryRecordStore, InMemoryVectorIndex};
    use crate::testing::{sample_records, HashingEmbedding, ScriptedLlm, UnreachableIndex};

    async fn service(llm: Arc<ScriptedLlm>) -> RecommendationService {
        let embedding = Arc::new(HashingEmbedding::new(256));
        let index = Arc::new(InMemoryVectorIndex::new());
        IngestionService::new(
            Arc::new(InMemoryRecordStore::new(sample_records())),
            embedding.clone(),
            index.clone(),
        )
        .ingest()
        .await
        .unwrap();

        RecommendationService::new(
            Arc::new(RetrievalService::new(embedding, index, 3)),
            RecommendationComposer::new(llm, Prompts::default())
                .with_retry(RetryPolicy::none()),
        )
    }

    #[tokio::test]
    async fn test_recommend_end_to_end() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("1. Bakery 7\ntotal: 77, taste: 80, price: N/A, customer service: 75".to_string()),
            Ok("Warm and cozy, just like you.".to_string()),
        ]));

        let rec = service(llm.clone())
            .await
            .recommend("cozy cinnamon fireplace", 3)
            .await
            .unwrap();

        assert_eq!(rec.candidates.len(), 3);
        assert_eq!(rec.candidates[0].source_id, "bakery-7");
        assert_eq!(rec.candidates[0].rank, 1);
        assert_eq!(rec.bakeries.len(), 1);
        assert_eq!(rec.bakeries[0].title, "Bakery 7");
        assert_eq!(rec.bakeries[0].scores.total, Some(77.0));
        assert_eq!(rec.explanation.as_deref(), Some("Warm and cozy, just like you."));
        assert!(rec.parse_error.is_none());
        assert!(llm.prompts()[0].contains("cinnamon cozy fireplace"));
    }

    #[tokio::test]
    async fn test_unstructured_answer_still_returned() {
        let llm = Arc::new(ScriptedLlm::answering("Try the one with the fireplace!"));

        let rec = service(llm).await.recommend("cozy", 2).await.unwrap();

        assert_eq!(rec.text, "Try the one with the fireplace!");
        assert!(rec.bakeries.is_empty());
        assert!(rec.parse_error.is_some());
        assert_eq!(rec.candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_index_surfaces() {
        let service = RecommendationService::new(
            Arc::new(RetrievalService::new(
                Arc::new(HashingEmbedding::new(64)),
                Arc::new(UnreachableIndex),
                3,
            )),
            RecommendationComposer::new(
                Arc::new(ScriptedLlm::new(Vec::new())),
                Prompts::default(),
            ),
        );

        let err = service.recommend("cozy", 3).await.unwrap_err();
        assert!(matches!(err, DomainError::RetrievalUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_index_yields_no_results_message() {
        let llm = Arc::new(ScriptedLlm::new(Vec::new()));
        let service = RecommendationService::new(
            Arc::new(RetrievalService::new(
                Arc::new(HashingEmbedding::new(64)),
                Arc::new(InMemoryVectorIndex::new()),
                3,
            )),
            RecommendationComposer::new(llm.clone(), Prompts::default()),
        );

        let rec = service.recommend("cozy", 3).await.unwrap();

        assert!(rec.candidates.is_empty());
        assert!(rec.parse_error.is_none());
        assert_eq!(rec.text, Prompts::default().no_results_message);
        assert!(llm.prompts().is_empty());
    }
}
