use async_trait::async_trait;
use ::redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::debug;

use super::KvClient;
use crate::errors::ServiceError;

/// Redis-backed client. The connection manager is multiplexed and reconnects
/// on its own, so one instance is shared by every request in the process.
#[derive(Clone)]
pub struct RedisKv {
    conn: ConnectionManager,
}

impl RedisKv {
    pub async fn connect(url: &str) -> Result<Self, ServiceError> {
        let client = Client::open(url).map_err(ServiceError::unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(ServiceError::unavailable)?;
        debug!("connected to redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvClient for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(ServiceError::unavailable)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(ServiceError::unavailable)
    }
}
