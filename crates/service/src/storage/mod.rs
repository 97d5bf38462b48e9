//! Whole-document collection stores.
//!
//! Every backend keeps the full collection in one JSON document and
//! round-trips the entire document on each call. Reads and writes from
//! different callers are not isolated from each other; see the individual
//! backends for what exclusion, if any, they provide.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use configs::{BackendKind, StorageConfig};
use models::Record;

use crate::errors::ServiceError;

pub mod document;
pub mod file;
pub mod keyed;
pub mod kv;

pub use document::CollectionDocument;
pub use file::FileDocumentStore;
pub use keyed::KeyedDocumentStore;
pub use kv::{KvClient, MemoryKv, RedisKv};

/// Storage contract over one collection of untyped records.
///
/// A successful mutation is visible to every later `retrieve`/`list` on the
/// same instance.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Every record, order unspecified.
    async fn list(&self) -> Result<Vec<Record>, ServiceError>;
    async fn retrieve(&self, id: &str) -> Result<Record, ServiceError>;
    /// Insert `data` under a freshly generated id and return the stored record.
    async fn create(&self, data: Record) -> Result<Record, ServiceError>;
    /// Shallow-merge `partial` onto an existing record and return the result.
    async fn update(&self, id: &str, partial: Record) -> Result<Record, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
    /// Replace the backend's document with `raw` after validating its shape.
    async fn seed(&self, raw: &str) -> Result<(), ServiceError>;
    /// Short human-readable location of the document, for logs.
    fn describe(&self) -> String;
}

/// Build the store selected by configuration.
pub async fn open(cfg: &StorageConfig, resource: &str) -> Result<Arc<dyn CollectionStore>, ServiceError> {
    let store: Arc<dyn CollectionStore> = match cfg.backend {
        BackendKind::Redis => {
            let url = cfg
                .redis_url
                .as_deref()
                .ok_or_else(|| ServiceError::BackendUnavailable("storage.redis_url is not set".into()))?;
            let client = RedisKv::connect(url).await?;
            Arc::new(KeyedDocumentStore::new(client, &cfg.key, resource))
        }
        BackendKind::File => Arc::new(FileDocumentStore::new(&cfg.file_path, resource)),
    };
    info!(backend = %store.describe(), "collection store ready");
    Ok(store)
}
