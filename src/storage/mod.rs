//! Key-value persistence for exercise progress.
//!
//! Two scopes:
//! - `local`: durable settings (API key, language)
//! - `session`: the working dataset, its timestamp and exercise results
//!
//! Backends implement [`KvStore`]; [`Storage`] layers the exercise policy
//! (JSON encoding, timestamps, the recency window) on top.

mod file;
mod memory;
mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::{ExerciseResult, Storage, keys};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Stored value for '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key-value capability.
pub trait KvStore: Send {
    /// Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites any existing value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// No-op if the key doesn't exist.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
