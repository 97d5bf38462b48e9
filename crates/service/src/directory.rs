use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use models::{user::TOKEN_FIELD, NewUser, Record, User, UserPatch};

use crate::errors::ServiceError;
use crate::storage::CollectionStore;

/// Name of the sub-collection holding users inside the stored document.
pub const RESOURCE_NAME: &str = "users";

/// Typed user directory on top of a collection store.
///
/// Every record coming back from the store is converted into a [`User`];
/// a record that fails conversion is reported as malformed data.
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn CollectionStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self { Self { store } }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let records = self.store.list().await?;
        records.iter().map(as_user).collect()
    }

    pub async fn retrieve(&self, id: &str) -> Result<User, ServiceError> {
        as_user(&self.store.retrieve(id).await?)
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: NewUser) -> Result<User, ServiceError> {
        let user = as_user(&self.store.create(input.into_record()).await?)?;
        info!(user_id = %user.id, "user_created");
        Ok(user)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<User, ServiceError> {
        let user = as_user(&self.store.update(id, patch.into_record()).await?)?;
        info!(user_id = %user.id, "user_updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        info!(user_id = %id, "user_deleted");
        Ok(())
    }

    /// Return `Some(presented)` if any stored user's token equals it exactly.
    ///
    /// Scans the full listing on every call. A user without a token counts as
    /// having the empty token, so `""` matches such a user. `None` means no
    /// match; store failures are still errors.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{storage::{CollectionStore, KeyedDocumentStore, MemoryKv}, DirectoryService};
    /// let store = KeyedDocumentStore::new(MemoryKv::new(), "users", "users");
    /// tokio_test::block_on(store.seed(r#"{"users": {"1": {"id": "1", "username": "alice", "token": "hola"}}}"#)).unwrap();
    /// let directory = DirectoryService::new(Arc::new(store));
    /// assert_eq!(tokio_test::block_on(directory.check_token("hola")).unwrap(), Some("hola".to_string()));
    /// assert_eq!(tokio_test::block_on(directory.check_token("HOLA")).unwrap(), None);
    /// ```
    pub async fn check_token(&self, presented: &str) -> Result<Option<String>, ServiceError> {
        let records = self.store.list().await?;
        let matched = records.iter().any(|r| token_of(r) == Some(presented));
        debug!(scanned = records.len(), matched, "token check");
        Ok(matched.then(|| presented.to_string()))
    }
}

fn as_user(record: &Record) -> Result<User, ServiceError> {
    User::from_record(record).map_err(ServiceError::from)
}

/// Absent token reads as `""`; a non-string token never matches.
fn token_of(record: &Record) -> Option<&str> {
    match record.get(TOKEN_FIELD) {
        None => Some(""),
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::test_support::{memory_directory, SEED_DOCUMENT};

    const TWO_USERS: &str = r#"{"users": {
        "1": {"id": "1", "username": "alice", "token": "hola"},
        "2": {"id": "2", "username": "carol", "token": "adios"}
    }}"#;

    #[tokio::test]
    async fn create_then_retrieve_returns_input_plus_id() -> Result<(), anyhow::Error> {
        let dir = memory_directory(SEED_DOCUMENT).await?;
        let created = dir.create(NewUser { username: "pepe".into(), token: String::new() }).await?;
        assert!(!created.id.is_empty());
        assert_eq!(created.username, "pepe");
        assert_eq!(created.token, "");
        assert_eq!(dir.retrieve(&created.id).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn update_preserves_untouched_fields() -> Result<(), anyhow::Error> {
        let dir = memory_directory(SEED_DOCUMENT).await?;
        let updated = dir.update("1", UserPatch { username: Some("bob".into()), token: None }).await?;
        assert_eq!(updated, User { id: "1".into(), username: "bob".into(), token: "hola".into() });

        let updated = dir.update("1", UserPatch { username: None, token: Some("nuevo".into()) }).await?;
        assert_eq!(updated.username, "bob");
        assert_eq!(updated.token, "nuevo");
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_entry() -> Result<(), anyhow::Error> {
        let dir = memory_directory(TWO_USERS).await?;
        let before = dir.list().await?;
        dir.delete("1").await?;
        let after = dir.list().await?;
        assert_eq!(after.len(), before.len() - 1);
        assert!(matches!(dir.retrieve("1").await, Err(ServiceError::NotFound(_))));
        let carol = before.into_iter().find(|u| u.id == "2").expect("carol");
        assert_eq!(after, vec![carol]);
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_idempotent() -> Result<(), anyhow::Error> {
        let dir = memory_directory(TWO_USERS).await?;
        let first: HashSet<_> = dir.list().await?.into_iter().map(|u| u.id).collect();
        let second: HashSet<_> = dir.list().await?.into_iter().map(|u| u.id).collect();
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() -> Result<(), anyhow::Error> {
        let dir = memory_directory(SEED_DOCUMENT).await?;
        assert!(matches!(dir.retrieve("999").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(dir.update("999", UserPatch::default()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(dir.delete("999").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn record_without_username_is_malformed() -> Result<(), anyhow::Error> {
        let dir = memory_directory(r#"{"users": {"1": {"id": "1", "token": "hola"}}}"#).await?;
        assert!(matches!(dir.retrieve("1").await, Err(ServiceError::Model(_))));
        assert!(matches!(dir.list().await, Err(ServiceError::Model(_))));
        Ok(())
    }

    #[tokio::test]
    async fn check_token_matches_exactly() -> Result<(), anyhow::Error> {
        let dir = memory_directory(TWO_USERS).await?;
        assert_eq!(dir.check_token("hola").await?, Some("hola".to_string()));
        assert_eq!(dir.check_token("adios").await?, Some("adios".to_string()));
        assert_eq!(dir.check_token("Hola").await?, None);
        assert_eq!(dir.check_token("hol").await?, None);
        assert_eq!(dir.check_token("").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn empty_token_matches_user_without_token() -> Result<(), anyhow::Error> {
        let dir = memory_directory(SEED_DOCUMENT).await?;
        assert_eq!(dir.check_token("").await?, None);
        dir.create(NewUser { username: "pepe".into(), token: String::new() }).await?;
        assert_eq!(dir.check_token("").await?, Some(String::new()));

        let dir = memory_directory(r#"{"users": {"1": {"id": "1", "username": "alice"}}}"#).await?;
        assert_eq!(dir.check_token("").await?, Some(String::new()));
        Ok(())
    }

    #[tokio::test]
    async fn check_token_propagates_store_errors() {
        let store = crate::storage::KeyedDocumentStore::new(crate::storage::MemoryKv::new(), "users", "users");
        let dir = DirectoryService::new(Arc::new(store));
        assert!(matches!(dir.check_token("hola").await, Err(ServiceError::MalformedData(_))));
    }
}
