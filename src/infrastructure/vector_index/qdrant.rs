use async_trait::async_trait;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, ScoredPoint,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};

use crate::domain::{
    ports::VectorIndex, DomainError, Embedding, SearchDocument, SearchResult,
};

const SOURCE_ID: &str = "source_id";
const TITLE: &str = "title";
const TEXT: &str = "text";

/// A named Qdrant collection holding one point per bakery document.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorIndex {
    /// Builds the client. No request is made until the first operation, so an
    /// unreachable server surfaces per call rather than at startup.
    pub fn open(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::configuration(format!("qdrant client: {e}")))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Creates the collection when absent. Returns whether it was created.
    pub async fn ensure_collection(&self) -> Result<bool, DomainError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::retrieval_unavailable(e.to_string()))?;

        if exists {
            return Ok(false);
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(|e| DomainError::retrieval_unavailable(e.to_string()))?;

        tracing::info!(collection = %self.collection, dimension = self.dimension, "collection created");
        Ok(true)
    }

    fn to_point(document: &SearchDocument, embedding: &Embedding) -> Result<PointStruct, DomainError> {
        let payload: Payload = serde_json::json!({
            "source_id": document.metadata.source_id,
            "title": document.metadata.title,
            "text": document.text,
        })
        .try_into()
        .map_err(|_| DomainError::internal("failed to build point payload"))?;

        Ok(PointStruct::new(
            document.point_id().to_string(),
            embedding.as_slice().to_vec(),
            payload,
        ))
    }

    fn from_point(point: ScoredPoint) -> Option<SearchResult> {
        let payload = point.payload;
        let source_id = payload.get(SOURCE_ID)?.as_str()?.to_string();
        let title = payload
            .get(TITLE)
            .and_then(|v| v.as_str())
            .cloned()
            .unwrap_or_default();
        let text = payload.get(TEXT)?.as_str()?.to_string();

        Some(SearchResult {
            document: SearchDocument::new(source_id, title, text),
            score: point.score,
        })
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(
        &self,
        documents: &[SearchDocument],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        if documents.len() != embeddings.len() {
            return Err(DomainError::internal(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }
        if documents.is_empty() {
            return Ok(());
        }

        let points = documents
            .iter()
            .zip(embeddings)
            .map(|(doc, emb)| Self::to_point(doc, emb))
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| DomainError::retrieval_unavailable(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| {
                DomainError::retrieval_unavailable(format!(
                    "search in collection '{}' failed: {e}",
                    self.collection
                ))
            })?;

        let total = response.result.len();
        let results: Vec<SearchResult> = response
            .result
            .into_iter()
            .filter_map(Self::from_point)
            .collect();

        if results.len() < total {
            tracing::warn!(
                dropped = total - results.len(),
                "points without source metadata skipped"
            );
        }

        Ok(results)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DomainError::retrieval_unavailable(e.to_string()))?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}
