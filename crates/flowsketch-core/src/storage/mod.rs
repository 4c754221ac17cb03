//! Persistence: key-value backends and the diagram gateway on top of them.

mod file;
mod gateway;
mod memory;

pub use file::FileStore;
pub use gateway::{DiagramGateway, DiagramMeta, DiagramRecord, INDEX_KEY, RECORD_KEY_PREFIX};
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A string key-value backend.
///
/// The gateway only ever stores JSON text, so backends need no knowledge of diagrams.
pub trait KeyValueStore: Send + Sync {
    /// Value for `key`, or `None` when it was never set.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently set.
    fn keys(&self) -> StorageResult<Vec<String>>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
