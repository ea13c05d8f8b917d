//! The storage-backed [`TodoApi`] implementation.

use crate::blob::{BlobStorage, StorageError};
use std::sync::Arc;
use std::time::Duration;
use todo_pubsub_core::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use todo_pubsub_core::{ApiError, ApiFuture, DeleteAck, Todo, TodoApi, TodoId, TodoPatch, validate_text};

/// Blob the collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Record store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Name of the blob holding the collection
    pub storage_key: String,
    /// Simulated latency of `list`
    pub read_latency: Duration,
    /// Simulated latency of `create`, `update` and `delete`
    pub write_latency: Duration,
}

impl ApiConfig {
    /// Create a configuration with custom values
    #[must_use]
    pub fn new(storage_key: impl Into<String>, read_latency: Duration, write_latency: Duration) -> Self {
        Self {
            storage_key: storage_key.into(),
            read_latency,
            write_latency,
        }
    }

    /// Default key, no simulated latency
    #[must_use]
    pub fn instant() -> Self {
        Self::new(DEFAULT_STORAGE_KEY, Duration::ZERO, Duration::ZERO)
    }

    /// Set the blob name
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set both simulated latencies
    #[must_use]
    pub const fn with_latency(mut self, read: Duration, write: Duration) -> Self {
        self.read_latency = read;
        self.write_latency = write;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_STORAGE_KEY,
            Duration::from_millis(300),
            Duration::from_millis(200),
        )
    }
}

/// Environment dependencies for the record store
#[derive(Clone)]
pub struct ApiEnvironment {
    /// Clock for creation timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of new identifiers
    pub ids: Arc<dyn IdGenerator>,
}

impl ApiEnvironment {
    /// Creates a new `ApiEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }
}

impl Default for ApiEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIdGenerator))
    }
}

impl std::fmt::Debug for ApiEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEnvironment").finish_non_exhaustive()
    }
}

/// Record store persisting the whole collection as one JSON array blob.
///
/// Each operation reads the blob, changes it and writes it back without an
/// await point in between. Independent clients sharing one medium get
/// last-write-wins per operation; nothing merges concurrent writers.
#[derive(Debug, Clone)]
pub struct TodoApiClient<S> {
    storage: S,
    config: ApiConfig,
    env: ApiEnvironment,
}

impl<S: BlobStorage> TodoApiClient<S> {
    /// Record store with the system clock and random identifiers
    #[must_use]
    pub fn new(storage: S, config: ApiConfig) -> Self {
        Self::with_environment(storage, config, ApiEnvironment::default())
    }

    /// Record store with injected dependencies
    #[must_use]
    pub const fn with_environment(storage: S, config: ApiConfig, env: ApiEnvironment) -> Self {
        Self { storage, config, env }
    }

    /// The persistence medium
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Active settings
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn storage_error(error: StorageError) -> ApiError {
        ApiError::Storage(error.to_string())
    }

    fn read(&self) -> Result<Vec<Todo>, ApiError> {
        let key = &self.config.storage_key;
        match self.storage.get(key).map_err(Self::storage_error)? {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json).map_err(|e| ApiError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// An empty collection removes the blob; reading it back still yields
    /// an empty list.
    fn write(&self, todos: &[Todo]) -> Result<(), ApiError> {
        if todos.is_empty() {
            return self
                .storage
                .remove(&self.config.storage_key)
                .map_err(Self::storage_error);
        }
        let json = serde_json::to_string(todos).map_err(|e| ApiError::Storage(e.to_string()))?;
        self.storage
            .set(&self.config.storage_key, &json)
            .map_err(Self::storage_error)
    }

    fn fresh_id(&self, todos: &[Todo]) -> TodoId {
        loop {
            let id = self.env.ids.next_id();
            if todos.iter().all(|todo| todo.id != id) {
                return id;
            }
            tracing::debug!(%id, "Identifier already taken, drawing another");
        }
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

impl<S: BlobStorage> TodoApi for TodoApiClient<S> {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            simulate_latency(self.config.read_latency).await;

            let todos = self.read()?;
            tracing::debug!(count = todos.len(), "Listed todos");
            Ok(todos)
        })
    }

    fn create(&self, text: &str) -> ApiFuture<'_, Todo> {
        let text = text.to_string();
        Box::pin(async move {
            simulate_latency(self.config.write_latency).await;

            validate_text(&text)?;
            let mut todos = self.read()?;
            let todo = Todo::new(self.fresh_id(&todos), text, self.env.clock.now());
            todos.push(todo.clone());
            self.write(&todos)?;

            tracing::debug!(id = %todo.id, "Created todo");
            Ok(todo)
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            simulate_latency(self.config.write_latency).await;

            let mut todos = self.read()?;
            let todo = todos
                .iter_mut()
                .find(|todo| todo.id == id)
                .ok_or(ApiError::NotFound(id))?;
            patch.apply(todo)?;
            let updated = todo.clone();
            self.write(&todos)?;

            tracing::debug!(%id, completed = updated.completed, "Updated todo");
            Ok(updated)
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, DeleteAck> {
        Box::pin(async move {
            simulate_latency(self.config.write_latency).await;

            let mut todos = self.read()?;
            let before = todos.len();
            todos.retain(|todo| todo.id != id);
            self.write(&todos)?;

            tracing::debug!(%id, removed = before - todos.len(), "Deleted todo");
            Ok(DeleteAck::OK)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::blob::MemoryStorage;
    use todo_pubsub_core::environment::SequentialIdGenerator;
    use todo_pubsub_testing::test_clock;

    fn client(storage: MemoryStorage) -> TodoApiClient<MemoryStorage> {
        TodoApiClient::with_environment(
            storage,
            ApiConfig::instant(),
            ApiEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::default())),
        )
    }

    #[tokio::test]
    async fn missing_blob_lists_empty() {
        assert!(client(MemoryStorage::new()).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_blob_fails_list() {
        let storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();

        let error = client(storage).list().await.unwrap_err();
        assert!(matches!(error, ApiError::Corrupt { ref key, .. } if key == "todos"));
    }

    #[tokio::test]
    async fn create_skips_identifiers_already_persisted() {
        let storage = MemoryStorage::new();
        // Another client already used identifier 1
        storage
            .set(DEFAULT_STORAGE_KEY, r#"[{"id":1,"text":"Theirs","completed":false}]"#)
            .unwrap();

        let mine = client(storage).create("Mine").await.unwrap();
        assert_eq!(mine.id, TodoId::new(2));
    }

    #[tokio::test]
    async fn create_rejects_blank_text_without_writing() {
        let storage = MemoryStorage::new();
        let error = client(storage.clone()).create("  ").await.unwrap_err();
        assert_eq!(error, ApiError::Validation(todo_pubsub_core::ValidationError::EmptyText));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn deleting_the_last_record_removes_the_blob() {
        let storage = MemoryStorage::new();
        let api = client(storage.clone());
        let todo = api.create("Only one").await.unwrap();
        assert!(!storage.is_empty());

        api.delete(todo.id).await.unwrap();
        assert!(storage.is_empty());
        assert!(api.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn custom_storage_key_is_used() {
        let storage = MemoryStorage::new();
        let api = TodoApiClient::new(storage.clone(), ApiConfig::instant().with_storage_key("other"));
        api.create("Keyed").await.unwrap();

        assert!(storage.get("other").unwrap().is_some());
        assert!(storage.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn operations_wait_for_configured_latency() {
        let api = TodoApiClient::new(
            MemoryStorage::new(),
            ApiConfig::default(),
        );
        let started = tokio::time::Instant::now();
        api.create("Slow").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));

        let started = tokio::time::Instant::now();
        api.list().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
