use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bakery::{BakeryRecord, Review};

/// Rendered in place of a score the record does not carry.
pub const SCORE_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_id: String,
    pub title: String,
}

/// Flattened, embeddable projection of a [`BakeryRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl SearchDocument {
    pub fn new(
        source_id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            metadata: DocumentMetadata {
                source_id: source_id.into(),
                title: title.into(),
            },
        }
    }

    pub fn source_id(&self) -> &str {
        &self.metadata.source_id
    }

    /// Stable point id so that re-indexing a record overwrites its previous vector.
    pub fn point_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.metadata.source_id.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: SearchDocument,
    pub score: f32,
}

/// Renders one record as a single text document.
///
/// The layout is fixed: a title line, a scores line with every score in the
/// same order (missing ones as [`SCORE_PLACEHOLDER`]), then one line per review
/// in the record's order. A record without reviews ends after the scores line.
pub fn build_document(record: &BakeryRecord) -> SearchDocument {
    let scores = &record.scores;
    let mut text = format!(
        "Bakery: {}\nScores: total {}, taste {}, price {}, customer service {}",
        record.title,
        format_score(scores.total),
        format_score(scores.taste),
        format_score(scores.price),
        format_score(scores.customer_service),
    );

    for review in &record.reviews {
        text.push('\n');
        text.push_str(&format_review(review));
    }

    SearchDocument::new(&record.id, &record.title, text)
}

pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) if value.is_finite() => value.to_string(),
        _ => SCORE_PLACEHOLDER.to_string(),
    }
}

fn format_review(review: &Review) -> String {
    format!(
        "Review: {} (score: {}, keywords: {})",
        review.content,
        format_score(review.score),
        review.keywords.join(", ")
    )
}
