use async_trait::async_trait;
use tracing::{debug, info, instrument};

use models::Record;

use super::{document::CollectionDocument, kv::KvClient, CollectionStore};
use crate::errors::ServiceError;

/// Collection stored as JSON text under a single key of an external KV store.
///
/// There is no exclusion between callers: two concurrent mutations each read
/// the document, change their copy and write it back, so the later write wins
/// and the earlier change is lost.
pub struct KeyedDocumentStore<C> {
    client: C,
    key: String,
    resource: String,
}

impl<C: KvClient> KeyedDocumentStore<C> {
    pub fn new(client: C, key: &str, resource: &str) -> Self {
        Self { client, key: key.to_string(), resource: resource.to_string() }
    }

    pub fn client(&self) -> &C { &self.client }

    /// A missing key means the store was never seeded.
    async fn load(&self) -> Result<CollectionDocument, ServiceError> {
        let raw = self
            .client
            .get(&self.key)
            .await?
            .ok_or_else(|| ServiceError::MalformedData(format!("key `{}` has not been seeded", self.key)))?;
        CollectionDocument::parse(raw.as_bytes(), &self.resource)
    }

    async fn save(&self, doc: &CollectionDocument) -> Result<(), ServiceError> {
        self.client.set(&self.key, doc.to_json()?).await
    }

    async fn update_document<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut CollectionDocument) -> Result<T, ServiceError> + Send,
        T: Send,
    {
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }
}

#[async_trait]
impl<C: KvClient> CollectionStore for KeyedDocumentStore<C> {
    async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        let records = self.load().await?.records()?;
        debug!(key = %self.key, count = records.len(), "listed records");
        Ok(records)
    }

    async fn retrieve(&self, id: &str) -> Result<Record, ServiceError> {
        self.load().await?.get(id)
    }

    #[instrument(skip(self, data), fields(key = %self.key))]
    async fn create(&self, data: Record) -> Result<Record, ServiceError> {
        let created = self.update_document(|doc| Ok(doc.insert_new(data))).await?;
        info!(id = ?created.get("id"), "record created");
        Ok(created)
    }

    #[instrument(skip(self, partial), fields(key = %self.key))]
    async fn update(&self, id: &str, partial: Record) -> Result<Record, ServiceError> {
        let updated = self.update_document(|doc| doc.merge(id, partial)).await?;
        info!("record updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.update_document(|doc| doc.remove(id)).await?;
        info!("record deleted");
        Ok(())
    }

    async fn seed(&self, raw: &str) -> Result<(), ServiceError> {
        let doc = CollectionDocument::parse(raw.as_bytes(), &self.resource)?;
        self.save(&doc).await?;
        info!(key = %self.key, records = doc.len(), "document seeded");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("keyed document `{}`", self.key)
    }
}
