use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::RwLock;

use crate::domain::{
    ports::VectorIndex, DomainError, Embedding, SearchDocument, SearchResult,
};

/// Brute-force cosine index for tests and local runs without Qdrant.
///
/// Documents are keyed by source id; equal scores keep insertion order.
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<(SearchDocument, Embedding)>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
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

        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for (document, embedding) in documents.iter().zip(embeddings) {
            match entries
                .iter_mut()
                .find(|(d, _)| d.source_id() == document.source_id())
            {
                Some(entry) => *entry = (document.clone(), embedding.clone()),
                None => entries.push((document.clone(), embedding.clone())),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|(document, embedding)| SearchResult {
                document: document.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(entries.len())
    }
}
