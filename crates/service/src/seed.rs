//! Initial document loading.

use serde_json::{json, Value};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::CollectionStore;

/// `{"<resource>": {}}`
pub fn default_document(resource: &str) -> String {
    let mut root = serde_json::Map::new();
    root.insert(resource.to_string(), json!({}));
    Value::Object(root).to_string()
}

/// Write `data` (or an empty document) as the store's whole document,
/// replacing whatever was there.
pub async fn init_db(store: &dyn CollectionStore, resource: &str, data: Option<&str>) -> Result<(), ServiceError> {
    let document = match data.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d.to_string(),
        None => {
            info!(resource, "no seed payload given, writing empty document");
            default_document(resource)
        }
    };
    store.seed(&document).await?;
    info!(backend = %store.describe(), "seed complete");
    Ok(())
}
