//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can prepare the storage
//! location without depending directly on `common`.

use configs::{BackendKind, StorageConfig};

/// Make sure the directory holding a file-backed document exists.
pub async fn ensure_storage(cfg: &StorageConfig) -> anyhow::Result<()> {
    match cfg.backend {
        BackendKind::File => common::env::ensure_parent_dir(&cfg.file_path).await,
        BackendKind::Redis => Ok(()),
    }
}

/// False when a file-backed document has not been written yet. Keyed stores
/// are only checked on first use.
pub async fn document_present(cfg: &StorageConfig) -> bool {
    match cfg.backend {
        BackendKind::File => tokio::fs::metadata(&cfg.file_path).await.is_ok(),
        BackendKind::Redis => true,
    }
}
