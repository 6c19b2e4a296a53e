use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding, SearchDocument, SearchResult};

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces documents; `embeddings[i]` belongs to `documents[i]`.
    async fn upsert(
        &self,
        documents: &[SearchDocument],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError>;

    /// Nearest documents first. May return fewer than `top_k`.
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;
}
