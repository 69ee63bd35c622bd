use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::snapshot::CART_STORAGE_KEY;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Cart store behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key the cart snapshot is persisted under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Bounded mailbox size for queued cart commands (default: 64).
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// How long a caller waits for the store to answer (default: 1000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// When the snapshot write happens relative to the reply.
    #[serde(default)]
    pub persist_policy: PersistPolicy,
    /// Extra attempts after a failed snapshot write (default: 2).
    #[serde(default = "default_persist_retries")]
    pub persist_retries: u32,
    /// Linear backoff between write attempts in milliseconds (default: 50).
    #[serde(default = "default_persist_backoff_ms")]
    pub persist_backoff_ms: u64,
}

/// Write ordering for snapshot persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistPolicy {
    /// Write the snapshot, then acknowledge the caller.
    #[default]
    WriteThrough,
    /// Acknowledge first, write before the next command is handled.
    Eventual,
}

/// Where the file-backed store keeps its data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

fn default_mailbox_capacity() -> usize {
    64
}

fn default_request_timeout_ms() -> u64 {
    1000
}

fn default_persist_retries() -> u32 {
    2
}

fn default_persist_backoff_ms() -> u64 {
    50
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            mailbox_capacity: default_mailbox_capacity(),
            request_timeout_ms: default_request_timeout_ms(),
            persist_policy: PersistPolicy::default(),
            persist_retries: default_persist_retries(),
            persist_backoff_ms: default_persist_backoff_ms(),
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// How long a write-through caller waits for the snapshot write before
    /// being answered with `Persistence::Pending`. Half the request timeout,
    /// leaving the rest for time spent queued.
    pub fn write_through_deadline(&self) -> Duration {
        self.request_timeout() / 2
    }

    pub fn persist_backoff(&self) -> Duration {
        Duration::from_millis(self.persist_backoff_ms)
    }
}
