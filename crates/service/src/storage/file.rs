use std::{io::ErrorKind, path::{Path, PathBuf}};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::Record;

use super::{document::CollectionDocument, CollectionStore};
use crate::errors::ServiceError;

/// Collection stored as one local JSON file, read and rewritten in full.
///
/// Each read or read-modify-write holds the instance lock for its whole
/// duration, and writes land in a sibling temp file that is renamed over the
/// document, so no reader ever sees a partial file. Every write gets its own
/// temp file, which keeps that true across instances and processes. The lock
/// is per instance: two stores on the same path can still lose each other's
/// updates.
pub struct FileDocumentStore {
    path: PathBuf,
    resource: String,
    lock: Mutex<()>,
}

impl FileDocumentStore {
    pub fn new<P: Into<PathBuf>>(path: P, resource: &str) -> Self {
        Self { path: path.into(), resource: resource.to_string(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// `<path>.<uuid>.tmp`, unique per write so concurrent writers never share a temp file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}.tmp", Uuid::new_v4()));
        PathBuf::from(name)
    }

    /// A missing file means the store was never seeded.
    async fn read_document(&self) -> Result<CollectionDocument, ServiceError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ServiceError::MalformedData(format!("{} has not been seeded", self.path.display())));
            }
            Err(e) => return Err(ServiceError::unavailable(e)),
        };
        CollectionDocument::parse(&bytes, &self.resource)
    }

    async fn write_document(&self, doc: &CollectionDocument) -> Result<(), ServiceError> {
        let data = doc.to_vec()?;
        let tmp = self.temp_path();
        fs::write(&tmp, data).await.map_err(ServiceError::unavailable)?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::unavailable(e));
        }
        Ok(())
    }

    async fn with_document<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&CollectionDocument) -> Result<T, ServiceError> + Send,
    {
        let _guard = self.lock.lock().await;
        let doc = self.read_document().await?;
        f(&doc)
    }

    async fn update_document<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut CollectionDocument) -> Result<T, ServiceError> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        let out = f(&mut doc)?;
        self.write_document(&doc).await?;
        Ok(out)
    }
}

#[async_trait]
impl CollectionStore for FileDocumentStore {
    async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        let records = self.with_document(|doc| doc.records()).await?;
        debug!(path = %self.path.display(), count = records.len(), "listed records");
        Ok(records)
    }

    async fn retrieve(&self, id: &str) -> Result<Record, ServiceError> {
        self.with_document(|doc| doc.get(id)).await
    }

    #[instrument(skip(self, data), fields(path = %self.path.display()))]
    async fn create(&self, data: Record) -> Result<Record, ServiceError> {
        let created = self.update_document(|doc| Ok(doc.insert_new(data))).await?;
        info!(id = ?created.get("id"), "record created");
        Ok(created)
    }

    #[instrument(skip(self, partial), fields(path = %self.path.display()))]
    async fn update(&self, id: &str, partial: Record) -> Result<Record, ServiceError> {
        let updated = self.update_document(|doc| doc.merge(id, partial)).await?;
        info!("record updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.update_document(|doc| doc.remove(id)).await?;
        info!("record deleted");
        Ok(())
    }

    async fn seed(&self, raw: &str) -> Result<(), ServiceError> {
        let doc = CollectionDocument::parse(raw.as_bytes(), &self.resource)?;
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::unavailable)?;
        }
        self.write_document(&doc).await?;
        info!(path = %self.path.display(), records = doc.len(), "document seeded");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file document {}", self.path.display())
    }
}
