//! The record store contract.
//!
//! Containers talk to the persisted collection only through [`TodoApi`].
//! The storage-backed implementation lives in `todo-pubsub-storage`; tests
//! wrap it to inject failures.
//!
//! # Dyn Compatibility
//!
//! Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn` so
//! containers can hold an `Arc<dyn TodoApi>`.

use crate::error::ApiError;
use crate::todo::{Todo, TodoId, TodoPatch};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Future returned by every [`TodoApi`] operation
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Acknowledgement returned by [`TodoApi::delete`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    /// Always true when the operation resolved
    pub success: bool,
}

impl DeleteAck {
    /// A successful acknowledgement
    pub const OK: Self = Self { success: true };
}

/// Asynchronous CRUD over the persisted todo collection.
///
/// Operations issued by one caller are not serialized against each other;
/// issuing two writes without awaiting the first gives last-write-wins.
pub trait TodoApi: Send + Sync {
    /// The full collection in insertion order.
    ///
    /// A missing collection is an empty list.
    ///
    /// # Errors
    ///
    /// [`ApiError::Corrupt`] when the persisted collection cannot be read back,
    /// [`ApiError::Storage`] when the medium fails.
    fn list(&self) -> ApiFuture<'_, Vec<Todo>>;

    /// Appends a new record with a fresh identifier, `completed = false`
    /// and the current time, and returns it.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for unacceptable text, plus the errors of
    /// [`TodoApi::list`].
    fn create(&self, text: &str) -> ApiFuture<'_, Todo>;

    /// Applies `patch` to the record with identifier `id` and returns the result.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no such record exists (the collection is
    /// left unchanged), [`ApiError::Validation`] for an invalid patch, plus
    /// the errors of [`TodoApi::list`].
    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo>;

    /// Removes the record with identifier `id` if present.
    ///
    /// Deleting a missing record succeeds.
    ///
    /// # Errors
    ///
    /// The errors of [`TodoApi::list`].
    fn delete(&self, id: TodoId) -> ApiFuture<'_, DeleteAck>;
}
