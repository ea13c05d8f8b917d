//! Storage-backed todo record store.
//!
//! This crate provides the [`TodoApi`](todo_pubsub_core::TodoApi)
//! implementation the demo runs against. The whole collection lives in one
//! named JSON blob inside a [`BlobStorage`] medium:
//!
//! - [`MemoryStorage`]: a shared in-process map. Clones see the same blobs,
//!   which is how independent clients share one store.
//! - [`FileStorage`]: one `<key>.json` file per blob under a directory.
//!
//! Every operation reads the blob, changes it, and writes it back in full
//! after an artificial latency that imitates a network round trip.
//!
//! # Example
//!
//! ```
//! use todo_pubsub_core::{TodoApi, TodoPatch};
//! use todo_pubsub_storage::{ApiConfig, MemoryStorage, TodoApiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = TodoApiClient::new(MemoryStorage::new(), ApiConfig::instant());
//!
//! let todo = api.create("Buy milk").await?;
//! let done = api.update(todo.id, TodoPatch::completed(true)).await?;
//! assert!(done.completed);
//! assert_eq!(api.list().await?, vec![done]);
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod client;

pub use blob::{BlobStorage, FileStorage, MemoryStorage, StorageError};
pub use client::{ApiConfig, ApiEnvironment, DEFAULT_STORAGE_KEY, TodoApiClient};
