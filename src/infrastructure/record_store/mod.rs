mod in_memory;
mod redis;

pub use in_memory::InMemoryRecordStore;
pub use redis::{create_pool, RedisPool, RedisRecordStore};
