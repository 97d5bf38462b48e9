use async_trait::async_trait;
use dashmap::DashMap;

use super::KvClient;
use crate::errors::ServiceError;

/// In-process key-value map, for tests and single-node development.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl KvClient for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
