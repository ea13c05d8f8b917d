//! Integration tests for the storage-backed record store
//!
//! Exercises the `TodoApi` contract against both persistence media,
//! including independent clients sharing one medium.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::DateTime;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use todo_pubsub_core::environment::SequentialIdGenerator;
use todo_pubsub_core::{ApiError, TodoApi, TodoId, TodoPatch};
use todo_pubsub_storage::{
    ApiConfig, ApiEnvironment, BlobStorage, FileStorage, MemoryStorage, TodoApiClient,
};
use todo_pubsub_testing::test_clock;

// ============================================================================
// Test Fixtures
// ============================================================================

fn client<S: BlobStorage>(storage: S) -> TodoApiClient<S> {
    TodoApiClient::with_environment(
        storage,
        ApiConfig::instant(),
        ApiEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::default())),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// Contract
// ============================================================================

#[tokio::test]
async fn create_then_list_contains_record() {
    let api = client(MemoryStorage::new());

    let todo = api.create("Buy milk").await.unwrap();
    assert_eq!(todo.text, "Buy milk");
    assert!(!todo.completed);
    assert!(DateTime::parse_from_rfc3339(&todo.created_at.to_rfc3339()).is_ok());

    assert_eq!(api.list().await.unwrap(), vec![todo]);
}

#[tokio::test]
async fn collection_keeps_insertion_order() {
    let api = client(MemoryStorage::new());
    for text in ["first", "second", "third"] {
        api.create(text).await.unwrap();
    }

    let texts: Vec<String> = api.list().await.unwrap().into_iter().map(|t| t.text).collect();
    assert_eq!(texts, ["first", "second", "third"]);
}

#[tokio::test]
async fn update_missing_record_fails_and_changes_nothing() {
    let storage = MemoryStorage::new();
    let api = client(storage.clone());
    api.create("Keep me").await.unwrap();
    let before = storage.get("todos").unwrap();

    let error = api
        .update(TodoId::new(999), TodoPatch::completed(true))
        .await
        .unwrap_err();

    assert_eq!(error, ApiError::NotFound(TodoId::new(999)));
    assert_eq!(storage.get("todos").unwrap(), before);
}

#[tokio::test]
async fn update_with_invalid_text_changes_nothing() {
    let api = client(MemoryStorage::new());
    let todo = api.create("Original").await.unwrap();

    let error = api.update(todo.id, TodoPatch::text("")).await.unwrap_err();
    assert!(matches!(error, ApiError::Validation(_)));
    assert_eq!(api.list().await.unwrap(), vec![todo]);
}

#[tokio::test]
async fn delete_missing_record_is_idempotent() {
    let api = client(MemoryStorage::new());
    let todo = api.create("Stay").await.unwrap();

    let ack = api.delete(TodoId::new(12345)).await.unwrap();
    assert!(ack.success);
    assert_eq!(api.list().await.unwrap(), vec![todo.clone()]);

    api.delete(todo.id).await.unwrap();
    api.delete(todo.id).await.unwrap();
    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn complete_round_trip_changes_only_completed() {
    let api = client(MemoryStorage::new());
    let created = api.create("Round trip").await.unwrap();
    assert_eq!(api.list().await.unwrap().len(), 1);

    let updated = api.update(created.id, TodoPatch::completed(true)).await.unwrap();
    let listed = api.list().await.unwrap();

    assert_eq!(listed, vec![updated.clone()]);
    assert!(updated.completed);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.text, created.text);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn empty_patch_returns_record_unchanged() {
    let api = client(MemoryStorage::new());
    let todo = api.create("As is").await.unwrap();

    assert_eq!(api.update(todo.id, TodoPatch::default()).await.unwrap(), todo);
}

// ============================================================================
// Shared persistence
// ============================================================================

#[tokio::test]
async fn two_clients_share_one_store() {
    let storage = MemoryStorage::new();
    // Each client has its own identifier sequence; both start at 1
    let client_a = client(storage.clone());
    let client_b = client(storage.clone());

    client_a.create("X").await.unwrap();

    let seen_by_b = client_b.list().await.unwrap();
    assert_eq!(seen_by_b.len(), 1);
    assert_eq!(seen_by_b[0].text, "X");

    client_b.create("Y").await.unwrap();

    let seen_by_a = client_a.list().await.unwrap();
    let texts: Vec<&str> = seen_by_a.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["X", "Y"]);

    let ids: HashSet<TodoId> = seen_by_a.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 2, "identifiers must stay unique across clients");
}

#[tokio::test]
async fn file_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let todo = {
        let api = client(FileStorage::open(dir.path()).unwrap());
        let todo = api.create("Pre-refresh Todo").await.unwrap();
        api.update(todo.id, TodoPatch::completed(true)).await.unwrap()
    };

    let reopened = client(FileStorage::open(dir.path()).unwrap());
    assert_eq!(reopened.list().await.unwrap(), vec![todo]);
}

#[tokio::test]
async fn persisted_blob_is_plain_json_array() {
    let storage = MemoryStorage::new();
    let api = client(storage.clone());
    api.create("Inspect").await.unwrap();

    let raw = storage.get("todos").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];
    assert_eq!(record["id"], 1);
    assert_eq!(record["text"], "Inspect");
    assert_eq!(record["completed"], false);
    assert_eq!(record["createdAt"], "2025-01-01T00:00:00Z");
}

proptest! {
    #[test]
    fn rapid_creates_get_unique_identifiers(texts in prop::collection::vec("[a-z]{1,20}", 1..40)) {
        let rt = runtime();
        // Random identifiers, as in production
        let api = TodoApiClient::new(MemoryStorage::new(), ApiConfig::instant());

        let created: Vec<_> = rt.block_on(async {
            let mut created = Vec::new();
            for text in &texts {
                created.push(api.create(text).await.unwrap());
            }
            created
        });

        let ids: HashSet<TodoId> = created.iter().map(|t| t.id).collect();
        prop_assert_eq!(ids.len(), texts.len());

        let listed = rt.block_on(api.list()).unwrap();
        prop_assert_eq!(listed, created);
    }
}
