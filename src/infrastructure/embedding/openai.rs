use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel as _;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// OpenAI embeddings through rig. The client reads `OPENAI_API_KEY`.
pub struct OpenAiEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self
            .client
            .embedding_model_with_ndims(&self.model, self.dimension);

        let embedding = model
            .embed_text(text)
            .await
            .map_err(|e| DomainError::external(format!("embedding failed: {e}")))?;

        Ok(Embedding::from(embedding.vec))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self
            .client
            .embedding_model_with_ndims(&self.model, self.dimension);

        // One request per batch keeps the response in input order.
        let embeddings = model
            .embed_texts(texts.iter().map(|t| t.to_string()))
            .await
            .map_err(|e| DomainError::external(format!("embedding failed: {e}")))?;

        if embeddings.len() != texts.len() {
            return Err(DomainError::external(format!(
                "expected {} embeddings, provider returned {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings
            .into_iter()
            .map(|e| Embedding::from(e.vec))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
