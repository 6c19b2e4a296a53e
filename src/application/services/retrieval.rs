use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    DomainError, RetrievalResult, RetrievedDocument,
};

pub struct RetrievalService {
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    default_top_k: usize,
    max_top_k: usize,
}

impl RetrievalService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            index,
            default_top_k,
            max_top_k: default_top_k.max(20),
        }
    }

    pub fn with_max_top_k(mut self, max_top_k: usize) -> Self {
        self.max_top_k = max_top_k;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    /// The `top_k` nearest documents, nearest first.
    ///
    /// An index holding fewer than `top_k` documents yields a short result,
    /// not an error. At most `max_top_k` documents are fetched; a larger
    /// `top_k` is reported as a shortfall. Every call goes to the index.
    #[instrument(skip(self), fields(found = tracing::field::Empty))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalResult, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }
        if top_k == 0 {
            return Err(DomainError::validation("k must be a positive integer"));
        }
        let fetch = top_k.min(self.max_top_k);

        let embedding = self.embedding.embed(query).await.map_err(unavailable)?;
        let hits = self.index.search(&embedding, fetch).await.map_err(unavailable)?;

        let documents: Vec<RetrievedDocument> = hits
            .into_iter()
            .take(fetch)
            .enumerate()
            .map(|(i, hit)| RetrievedDocument {
                rank: i + 1,
                score: hit.score,
                document: hit.document,
            })
            .collect();

        let result = RetrievalResult {
            query: query.to_string(),
            requested: top_k,
            documents,
        };

        tracing::Span::current().record("found", result.len() as u64);
        if result.is_short() {
            tracing::debug!(
                requested = top_k,
                shortfall = result.shortfall(),
                "index returned fewer documents than requested"
            );
        }

        Ok(result)
    }
}

// The embedding endpoint is part of the index capability from the caller's view.
fn unavailable(e: DomainError) -> DomainError {
    match e {
        DomainError::ExternalService(msg) | DomainError::Timeout(msg) => {
            DomainError::RetrievalUnavailable(msg)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::IngestionService;
    use crate::infrastructure::{InMemoryRecordStore, InMemoryVectorIndex};
    use crate::testing::{sample_records, HashingEmbedding, UnreachableIndex};
    use std::collections::HashSet;

    async fn indexed(records: Vec<crate::domain::BakeryRecord>) -> RetrievalService {
        let embedding = Arc::new(HashingEmbedding::new(256));
        let index = Arc::new(InMemoryVectorIndex::new());
        IngestionService::new(
            Arc::new(InMemoryRecordStore::new(records)),
            embedding.clone(),
            index.clone(),
        )
        .ingest()
        .await
        .unwrap();
        RetrievalService::new(embedding, index, 3)
    }

    #[tokio::test]
    async fn test_top_three_of_ten_nearest_first() {
        let service = indexed(sample_records()).await;

        let result = service
            .retrieve_top_k("cozy cinnamon fireplace", 3)
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        assert!(!result.is_short());
        assert_eq!(result.documents[0].document.source_id(), "bakery-7");
        let ranks: Vec<usize> = result.documents.iter().map(|d| d.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(result
            .documents
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_result() {
        let service = RetrievalService::new(
            Arc::new(HashingEmbedding::new(64)),
            Arc::new(InMemoryVectorIndex::new()),
            3,
        );

        let result = service.retrieve("anything sweet").await.unwrap();

        assert!(result.is_empty());
        assert!(result.is_short());
        assert_eq!(result.shortfall(), 3);
    }

    #[tokio::test]
    async fn test_short_result_when_k_exceeds_index() {
        let service = indexed(sample_records().into_iter().take(2).collect()).await;

        let result = service.retrieve_top_k("bagel", 5).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.shortfall(), 3);
    }

    #[tokio::test]
    async fn test_same_query_same_members() {
        let service = indexed(sample_records()).await;

        let first: HashSet<String> = service
            .retrieve("modern minimalist matcha")
            .await
            .unwrap()
            .source_ids()
            .map(str::to_string)
            .collect();
        let second: HashSet<String> = service
            .retrieve("modern minimalist matcha")
            .await
            .unwrap()
            .source_ids()
            .map(str::to_string)
            .collect();

        assert_eq!(first, second);
        assert!(first.contains("bakery-1"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let service = indexed(sample_records()).await;

        assert!(matches!(
            service.retrieve_top_k("   ", 3).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.retrieve_top_k("bread", 0).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_k_beyond_index_size_is_short_result() {
        let service = indexed(sample_records()).await;

        let result = service.retrieve_top_k("bread", 25).await.unwrap();

        assert_eq!(result.requested, 25);
        assert_eq!(result.len(), 10);
        assert_eq!(result.shortfall(), 15);
        let ranks: Vec<usize> = result.documents.iter().map(|d| d.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_k_above_fetch_cap_is_clamped() {
        let service = indexed(sample_records()).await.with_max_top_k(4);

        let result = service.retrieve_top_k("bread", 1000).await.unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.requested, 1000);
        assert!(result.is_short());
    }

    #[tokio::test]
    async fn test_unreachable_index_is_unavailable() {
        let service = RetrievalService::new(
            Arc::new(HashingEmbedding::new(64)),
            Arc::new(UnreachableIndex),
            3,
        );

        let err = service.retrieve("bread").await.unwrap_err();
        assert!(matches!(err, DomainError::RetrievalUnavailable(_)));
    }
}
