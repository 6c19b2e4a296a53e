//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) only. Ingestion runs offline
//! and fills the vector index; retrieval, composition and recommendation run
//! per request against an index that is read-only at that point.

pub mod prompts;
pub mod retry;
pub mod services;

pub use prompts::{PromptTemplate, Prompts};
pub use retry::RetryPolicy;
pub use services::{
    Composition, IngestionReport, IngestionService, RecommendationComposer,
    RecommendationService, RetrievalService,
};
