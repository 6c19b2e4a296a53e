pub mod config;
pub mod context;
pub mod embedding;
pub mod llm;
pub mod record_store;
pub mod telemetry;
pub mod vector_index;

pub use config::{AppConfig, Config};
pub use context::{OpenMode, ServiceContext};
pub use embedding::OpenAiEmbedding;
pub use llm::OpenAiLlm;
pub use record_store::{create_pool, InMemoryRecordStore, RedisPool, RedisRecordStore};
pub use vector_index::{InMemoryVectorIndex, QdrantVectorIndex};
