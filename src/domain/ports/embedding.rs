use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding};

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;

    /// Embeddings come back in the order of `texts`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;

    fn dimension(&self) -> usize;
}
