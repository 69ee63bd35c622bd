//! File-backed storage: one JSON file per key under a data directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;

use super::{KeyValueStore, StorageError};

/// Stores each key in `<dir>/<sanitized key>.json`.
///
/// Writes go to a temp file that is renamed over the target, under an
/// exclusive advisory lock, so readers never see a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default data directory: `<data dir>/gomarket-cart`.
    ///
    /// Falls back to the current directory if the platform has none.
    pub fn default_dir() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("gomarket-cart")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        tokio::task::spawn_blocking(move || read_value(&path))
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let value = value.to_string();
        tokio::task::spawn_blocking(move || write_value(&path, &value))
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }
}

/// Map a key onto a file name. Anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn read_value(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn write_value(path: &Path, value: &str) -> Result<(), StorageError> {
    let io_err = |source: io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let lock_path = path.with_extension("lock");
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(io_err)?;
    lock.lock_exclusive().map_err(|source| StorageError::Lock {
        path: lock_path.clone(),
        source,
    })?;

    let result = replace_file(path, value).map_err(io_err);

    if let Err(e) = FileExt::unlock(&lock) {
        tracing::debug!(path = %lock_path.display(), error = %e, "Failed to release storage lock");
    }

    result
}

/// Write to a sibling temp file, then rename it over `path`.
fn replace_file(path: &Path, value: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let mut tmp = File::create(&tmp_path)?;
    tmp.write_all(value.as_bytes())?;
    tmp.sync_all()?;
    fs::rename(&tmp_path, path)
}
