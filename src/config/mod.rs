//! Configuration loading for the cart store and its storage backend.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, PersistPolicy, StorageConfig, StoreConfig};
