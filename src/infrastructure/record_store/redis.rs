use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};
use std::collections::HashMap;

use crate::domain::{ports::RecordStore, BakeryRecord, DomainError};

pub type RedisPool = Pool;

pub fn create_pool(redis_url: &str) -> Result<RedisPool, DomainError> {
    Config::from_url(redis_url)
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| DomainError::configuration(format!("redis pool: {e}")))
}

/// Bakery records kept in one Redis hash: field = record id, value = record JSON.
#[derive(Clone)]
pub struct RedisRecordStore {
    pool: RedisPool,
    key: String,
}

impl RedisRecordStore {
    pub fn new(pool: RedisPool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }

    pub fn close(&self) {
        self.pool.close();
    }

    async fn conn(&self) -> Result<Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::external(format!("redis pool: {e}")))
    }

    fn decode(field: &str, raw: &str) -> Result<BakeryRecord, serde_json::Error> {
        let mut record: BakeryRecord = serde_json::from_str(raw)?;
        if record.id.is_empty() {
            record.id = field.to_string();
        }
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn load_all(&self) -> Result<Vec<BakeryRecord>, DomainError> {
        let mut conn = self.conn().await?;
        let raw: HashMap<String, String> = conn
            .hgetall(&self.key)
            .await
            .map_err(|e| DomainError::external(format!("redis: {e}")))?;

        let mut records: Vec<BakeryRecord> = raw
            .iter()
            .filter_map(|(field, json)| match Self::decode(field, json) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key = %self.key, field = %field, error = %e, "undecodable bakery record skipped");
                    None
                }
            })
            .collect();

        // Hash iteration order is arbitrary.
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<BakeryRecord>, DomainError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .hget(&self.key, id)
            .await
            .map_err(|e| DomainError::external(format!("redis: {e}")))?;

        raw.map(|json| Self::decode(id, &json))
            .transpose()
            .map_err(|e| DomainError::internal(format!("record {id}: {e}")))
    }

    async fn put_all(&self, records: &[BakeryRecord]) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }

        let items = records
            .iter()
            .map(|r| {
                r.validate()?;
                let json = serde_json::to_string(r)
                    .map_err(|e| DomainError::internal(e.to_string()))?;
                Ok((r.id.clone(), json))
            })
            .collect::<Result<Vec<(String, String)>, DomainError>>()?;

        let mut conn = self.conn().await?;
        conn.hset_multiple::<_, _, _, ()>(&self.key, items.as_slice())
            .await
            .map_err(|e| DomainError::external(format!("redis: {e}")))?;

        tracing::info!(key = %self.key, count = items.len(), "bakery records stored");
        Ok(())
    }
}
