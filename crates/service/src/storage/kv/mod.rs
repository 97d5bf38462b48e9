use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryKv;
pub use self::redis::RedisKv;

/// Minimal string key-value client used by the keyed document store.
/// Implementations can be a remote KV server or an in-process map.
#[async_trait]
pub trait KvClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError>;
}
