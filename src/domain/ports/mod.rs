mod embedding;
mod llm;
mod record_store;
mod vector_index;

pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use record_store::RecordStore;
pub use vector_index::VectorIndex;
