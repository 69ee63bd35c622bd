//! In-process storage backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{KeyValueStore, StorageError};

/// Map-backed store shared between clones.
///
/// Supports fault injection so callers can exercise write failures and
/// slow writes without a real device.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
    failing_writes: Arc<AtomicUsize>,
    writes: Arc<AtomicU64>,
    write_delay: Arc<Mutex<Option<Duration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value, e.g. a snapshot from a previous run.
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.inner.lock().insert(key.to_string(), value.into());
        store
    }

    /// Read without going through the async trait.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    /// Make the next `count` calls to `set` fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Sleep this long inside every `set` before committing.
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        *self.write_delay.lock() = delay;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(StorageError::Unavailable(format!(
                "injected write failure for '{key}'"
            )));
        }

        self.inner.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
