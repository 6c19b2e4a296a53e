mod bakery;
mod document;
mod embedding;
mod recommendation;
mod retrieval;

pub use bakery::{BakeryRecord, Review, Scores};
pub use document::{
    build_document, format_score, DocumentMetadata, SearchDocument, SearchResult,
    SCORE_PLACEHOLDER,
};
pub use embedding::Embedding;
pub use recommendation::{
    parse_recommendations, Candidate, Recommendation, RecommendedBakery,
};
pub use retrieval::{RetrievalResult, RetrievedDocument};
