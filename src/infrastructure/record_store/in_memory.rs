use async_trait::async_trait;
use std::path::Path;
use std::sync::RwLock;

use crate::domain::{ports::RecordStore, BakeryRecord, DomainError};

/// Record store backed by a vector, also used to read JSON seed files.
pub struct InMemoryRecordStore {
    records: RwLock<Vec<BakeryRecord>>,
}

impl InMemoryRecordStore {
    pub fn new(records: Vec<BakeryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Parses a JSON array of bakery records.
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let records: Vec<BakeryRecord> = serde_json::from_str(raw)
            .map_err(|e| DomainError::validation(format!("invalid bakery JSON: {e}")))?;
        Ok(Self::new(records))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::not_found(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load_all(&self) -> Result<Vec<BakeryRecord>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(records.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<BakeryRecord>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn put_all(&self, incoming: &[BakeryRecord]) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for record in incoming {
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => records.push(record.clone()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_json_and_get() {
        let store = InMemoryRecordStore::from_json(
            r#"[{"_id": "b-1", "title": "Sunrise Bakery", "scores": {"total_score": 90}},
                {"_id": "b-2", "title": "Moon Oven"}]"#,
        )
        .unwrap();

        assert_eq!(store.load_all().await.unwrap().len(), 2);
        let found = store.get("b-2").await.unwrap().unwrap();
        assert_eq!(found.title, "Moon Oven");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_all_replaces_by_id() {
        let store = InMemoryRecordStore::new(vec![BakeryRecord::new("b-1", "Old")]);
        store
            .put_all(&[BakeryRecord::new("b-1", "New"), BakeryRecord::new("b-2", "Other")])
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "New");
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            InMemoryRecordStore::from_json("{not json"),
            Err(DomainError::Validation(_))
        ));
    }
}
