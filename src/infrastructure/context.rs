use std::sync::Arc;

use crate::application::{
    IngestionService, RecommendationComposer, RecommendationService, RetrievalService, RetryPolicy,
};
use crate::domain::ports::{EmbeddingService, LlmService, RecordStore, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::{
    create_pool, OpenAiEmbedding, OpenAiLlm, QdrantVectorIndex, RedisRecordStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Query-time: the collection must already exist; no record store.
    Serve,
    /// Batch ingestion: creates the collection if missing and opens Redis.
    Ingest,
}

/// Handles to every external service, opened once at startup and closed on shutdown.
pub struct ServiceContext {
    pub config: Arc<AppConfig>,
    pub embedding: Arc<dyn EmbeddingService>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub llm: Arc<dyn LlmService>,
    records: Option<RedisRecordStore>,
}

impl ServiceContext {
    pub async fn open(config: AppConfig, mode: OpenMode) -> Result<Self, DomainError> {
        config.validate()?;
        let c = &config.config;

        let index = QdrantVectorIndex::open(
            &c.vector_index.url,
            &c.vector_index.collection,
            c.embedding.dimension,
        )?;

        let records = match mode {
            OpenMode::Serve => None,
            OpenMode::Ingest => {
                index.ensure_collection().await?;
                let pool = create_pool(&c.record_store.redis_url)?;
                Some(RedisRecordStore::new(pool, &c.record_store.key))
            }
        };

        tracing::info!(
            ?mode,
            qdrant = %c.vector_index.url,
            collection = %c.vector_index.collection,
            llm = %c.llm.model,
            embedding = %c.embedding.model,
            "service context opened"
        );

        Ok(Self {
            embedding: Arc::new(OpenAiEmbedding::from_config(&c.embedding)),
            llm: Arc::new(OpenAiLlm::from_config(&c.llm)),
            vector_index: Arc::new(index),
            records,
            config: Arc::new(config),
        })
    }

    /// Assembles a context from already-built services.
    pub fn from_parts(
        config: AppConfig,
        embedding: Arc<dyn EmbeddingService>,
        vector_index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            embedding,
            vector_index,
            llm,
            records: None,
        }
    }

    pub fn record_store(&self) -> Option<Arc<dyn RecordStore>> {
        self.records
            .clone()
            .map(|store| Arc::new(store) as Arc<dyn RecordStore>)
    }

    pub fn retrieval_service(&self) -> RetrievalService {
        let retrieval = &self.config.config.retrieval;
        RetrievalService::new(
            self.embedding.clone(),
            self.vector_index.clone(),
            retrieval.top_k,
        )
        .with_max_top_k(retrieval.max_top_k)
    }

    pub fn recommendation_service(&self) -> RecommendationService {
        let c = &self.config.config;
        let composer = RecommendationComposer::new(self.llm.clone(), self.config.prompts.clone())
            .with_retry(RetryPolicy::from(&c.retry))
            .with_explanation(c.composer.explain);

        RecommendationService::new(Arc::new(self.retrieval_service()), composer)
    }

    pub fn ingestion_service(
        &self,
        records: Arc<dyn RecordStore>,
    ) -> IngestionService {
        IngestionService::new(records, self.embedding.clone(), self.vector_index.clone())
            .with_batch_size(self.config.config.ingestion.batch_size)
    }

    pub fn close(self) {
        if let Some(records) = &self.records {
            records.close();
        }
        tracing::info!("service context closed");
    }
}
