use async_trait::async_trait;

use crate::domain::{errors::DomainError, BakeryRecord};

/// Source of raw bakery records, read during ingestion only.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<BakeryRecord>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<BakeryRecord>, DomainError>;
    async fn put_all(&self, records: &[BakeryRecord]) -> Result<(), DomainError>;
}
