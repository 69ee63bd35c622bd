//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::sync::Arc;

use gomarket_cart::cart::Product;
use gomarket_cart::config::StoreConfig;
use gomarket_cart::storage::{FileStore, MemoryStore};
use gomarket_cart::store::CartScope;
use tempfile::TempDir;

pub fn product(id: &str, title: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        image_url: format!("https://img.example.com/{id}.png"),
        price,
    }
}

/// The product from the walkthrough: id "a", "Shoe", image "u", price 10.
pub fn shoe() -> Product {
    Product {
        id: "a".to_string(),
        title: "Shoe".to_string(),
        image_url: "u".to_string(),
        price: 10.0,
    }
}

/// Store config with negligible retry backoff.
pub fn test_store_config() -> StoreConfig {
    StoreConfig {
        persist_backoff_ms: 1,
        ..StoreConfig::default()
    }
}

pub fn memory_scope() -> (MemoryStore, CartScope) {
    let storage = MemoryStore::new();
    let scope = CartScope::spawn(Arc::new(storage.clone()), test_store_config());
    (storage, scope)
}

pub fn temp_file_store() -> (TempDir, FileStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(temp_dir.path().join("data"));
    (temp_dir, store)
}

/// Write a config.toml into a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
