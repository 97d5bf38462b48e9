#![cfg(test)]
use std::sync::Arc;

use models::Record;
use serde_json::Value;

use crate::directory::{DirectoryService, RESOURCE_NAME};
use crate::errors::ServiceError;
use crate::storage::{CollectionStore, FileDocumentStore, KeyedDocumentStore, MemoryKv};

pub const SEED_DOCUMENT: &str = r#"{"users": {"1": {"id": "1", "username": "alice", "token": "hola"}}}"#;

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("test record must be a JSON object")
}

/// File store on a unique temp path, seeded with alice/"hola".
pub async fn seeded_file_store() -> Result<FileDocumentStore, ServiceError> {
    let path = std::env::temp_dir().join(format!("user_dir_{}.json", uuid::Uuid::new_v4()));
    let store = FileDocumentStore::new(path, RESOURCE_NAME);
    store.seed(SEED_DOCUMENT).await?;
    Ok(store)
}

/// Directory over an in-memory keyed store seeded with `document`.
pub async fn memory_directory(document: &str) -> Result<DirectoryService, ServiceError> {
    let store = KeyedDocumentStore::new(MemoryKv::new(), RESOURCE_NAME, RESOURCE_NAME);
    store.seed(document).await?;
    Ok(DirectoryService::new(Arc::new(store)))
}
