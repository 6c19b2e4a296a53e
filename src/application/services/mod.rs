mod composer;
mod ingestion;
mod recommendation;
mod retrieval;

pub use composer::{Composition, RecommendationComposer};
pub use ingestion::{IngestionReport, IngestionService};
pub use recommendation::RecommendationService;
pub use retrieval::RetrievalService;
