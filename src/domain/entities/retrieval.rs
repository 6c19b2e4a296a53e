use serde::{Deserialize, Serialize};

use super::document::SearchDocument;

/// One hit of a retrieval, ranked from 1 (nearest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub rank: usize,
    pub score: f32,
    pub document: SearchDocument,
}

/// Ranked answer to a single query.
///
/// Holding fewer documents than requested is a normal outcome (the index may
/// simply be smaller than `requested`); see [`RetrievalResult::is_short`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub requested: usize,
    pub documents: Vec<RetrievedDocument>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_short(&self) -> bool {
        self.documents.len() < self.requested
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.documents.len())
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.document.source_id())
    }

    pub fn top(&self) -> Option<&RetrievedDocument> {
        self.documents.first()
    }
}
