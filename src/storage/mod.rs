//! Durable key-value storage behind the cart store.
//!
//! The store only needs two operations: read a string under a key and
//! overwrite the string under a key. Anything that can do that (a file, a
//! map in memory, a mobile platform's async storage) can back a cart.

mod file;
mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
///
/// These never reach cart consumers; the store logs and contains them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
///
/// `set` is last-write-wins; there are no transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`. `Ok(None)` when nothing was ever written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
