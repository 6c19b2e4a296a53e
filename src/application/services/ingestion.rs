use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    build_document,
    ports::{EmbeddingService, RecordStore, VectorIndex},
    DomainError, SearchDocument,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub loaded: usize,
    pub indexed: usize,
    pub skipped: usize,
}

/// Offline pipeline: record store -> documents -> embeddings -> vector index.
pub struct IngestionService {
    records: Arc<dyn RecordStore>,
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
}

impl IngestionService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            records,
            embedding,
            index,
            batch_size: 32,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[instrument(skip(self), fields(batch_size = self.batch_size))]
    pub async fn ingest(&self) -> Result<IngestionReport, DomainError> {
        let records = self.records.load_all().await?;
        let mut report = IngestionReport {
            loaded: records.len(),
            ..Default::default()
        };

        // Duplicate ids collapse onto one point; the first record wins.
        let mut seen = HashSet::new();
        let documents: Vec<SearchDocument> = records
            .iter()
            .filter(|record| match record.validate() {
                Ok(()) if seen.insert(record.id.clone()) => true,
                Ok(()) => {
                    tracing::warn!(id = %record.id, "duplicate record id skipped");
                    false
                }
                Err(e) => {
                    tracing::warn!(error = %e, "record skipped");
                    false
                }
            })
            .map(build_document)
            .collect();
        report.skipped = report.loaded - documents.len();

        for batch in documents.chunks(self.batch_size) {
            self.index_batch(batch).await?;
            report.indexed += batch.len();
            tracing::debug!(indexed = report.indexed, total = documents.len(), "batch indexed");
        }

        tracing::info!(
            loaded = report.loaded,
            indexed = report.indexed,
            skipped = report.skipped,
            "ingestion finished"
        );
        Ok(report)
    }

    async fn index_batch(&self, batch: &[SearchDocument]) -> Result<(), DomainError> {
        let texts: Vec<&str> = batch.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        self.index.upsert(batch, &embeddings).await
    }
}
