//! Named-blob persistence media.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised by a [`BlobStorage`] medium.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The key cannot name a blob on this medium
    #[error("Invalid blob key '{0}'")]
    InvalidKey(String),

    /// Reading or writing the blob failed
    #[error("I/O error on blob '{key}': {source}")]
    Io {
        /// Blob being accessed
        key: String,
        /// Underlying failure
        #[source]
        source: io::Error,
    },
}

/// A key/value medium holding whole string blobs, in the manner of a
/// browser's local storage.
///
/// Synchronous like local storage: implementations may block briefly, and
/// callers run them inline rather than through `tokio::fs`.
pub trait BlobStorage: Send + Sync {
    /// Reads the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes the blob stored under `key`. Missing blobs are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: BlobStorage + ?Sized> BlobStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process blob map shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true when no blob is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs().is_empty()
    }
}

impl BlobStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.blobs().remove(key);
        Ok(())
    }
}

/// Blobs stored as `<dir>/<key>.json`.
///
/// Each write goes to its own uniquely named temporary file in the same
/// directory, which is then renamed over the blob. Readers never observe a
/// partially written collection, and overlapping writers never share a
/// staging file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    /// Directory holding the blobs
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io_error = |source: io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };

        let mut staging = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        staging.write_all(value.as_bytes()).map_err(io_error)?;
        staging
            .persist(&path)
            .map_err(|error| io_error(error.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Err(source) if source.kind() != io::ErrorKind::NotFound => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    fn file_names(storage: &FileStorage) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(storage.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn memory_clones_share_blobs() {
        let first = MemoryStorage::new();
        let second = first.clone();

        first.set("todos", "[]").unwrap();
        assert_eq!(second.get("todos").unwrap().as_deref(), Some("[]"));

        second.remove("todos").unwrap();
        assert!(first.is_empty());
    }

    #[test]
    fn file_storage_round_trips_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("nested")).unwrap();

        assert_eq!(storage.get("todos").unwrap(), None);
        storage.set("todos", r#"[{"id":1}]"#).unwrap();

        let reopened = FileStorage::open(storage.dir()).unwrap();
        assert_eq!(reopened.get("todos").unwrap().as_deref(), Some(r#"[{"id":1}]"#));
        assert_eq!(file_names(&storage), vec!["todos.json".to_string()]);

        reopened.remove("todos").unwrap();
        reopened.remove("todos").unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(storage.get(key), Err(StorageError::InvalidKey(_))), "{key}");
        }
    }

    #[test]
    fn overlapping_file_writers_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        std::thread::scope(|scope| {
            let writers: Vec<_> = (0..8)
                .map(|writer| {
                    let storage = storage.clone();
                    scope.spawn(move || {
                        for round in 0..25 {
                            storage.set("todos", &format!("[{writer},{round}]")).unwrap();
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }
        });

        // Last write wins; no staging file is left behind
        let blob = storage.get("todos").unwrap().unwrap();
        assert!(blob.ends_with(",24]"), "{blob}");
        assert_eq!(file_names(&storage), vec!["todos.json".to_string()]);
    }
}
