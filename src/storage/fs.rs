//! Filesystem-backed durable cache
//!
//! ## Storage Layout
//!
//! ```text
//! {public-root}/
//! └── wilayah/
//!     ├── provinces.json
//!     ├── regencies_{province}.json
//!     ├── districts_{regency}.json
//!     └── villages_{district}.json
//! ```
//!
//! Entries never expire. Writes replace the whole file through a temporary
//! file and a rename. Every write gets its own temporary file; writers that
//! share an `FsStore` (or a clone of it) are also serialized by a per-key
//! lock. Independent stores and separate processes on the same root are not
//! coordinated beyond the atomic rename.

use crate::region::RegionEnvelope;
use crate::storage::CacheKey;
use crate::{StoreError, StoreResult};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Name of the directory holding region payloads under the public root
pub const STORE_DIR: &str = "wilayah";

/// Process-wide sequence for temporary file names
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// One stored payload, as found by [`FsStore::inventory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: CacheKey,
    pub bytes: u64,
}

/// Durable key → JSON-blob store rooted at a directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    locks: Arc<Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>>,
}

impl FsStore {
    /// Creates a store under `public_root`; nothing is created on disk yet
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            root: public_root.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Directory holding the payload files
    pub fn dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    /// Full path of the file backing `key`
    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir().join(key.file_name())
    }

    /// Returns true if a payload is stored for `key`
    pub async fn exists(&self, key: &CacheKey) -> bool {
        tokio::fs::metadata(self.path(key))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Reads the raw payload bytes
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - The stored bytes
    /// * `Err(StoreError::NotFound)` - Nothing is stored for `key`
    /// * `Err(StoreError::Io)` - The file exists but could not be read
    pub async fn read(&self, key: &CacheKey) -> StoreResult<Vec<u8>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.file_name())),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Reads and decodes a stored listing
    pub async fn read_envelope(&self, key: &CacheKey) -> StoreResult<RegionEnvelope> {
        let bytes = self.read(key).await?;
        RegionEnvelope::from_slice(&bytes).map_err(|source| StoreError::Decode {
            key: key.file_name(),
            source,
        })
    }

    /// Replaces the payload for `key` with `bytes`
    ///
    /// Creates the store directory on first use. Returns the written path.
    pub async fn write(&self, key: &CacheKey, bytes: &[u8]) -> StoreResult<PathBuf> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;

        let dir = self.dir();
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.path(key);
        let tmp = dir.join(tmp_name(key));
        if let Err(e) = write_then_rename(&tmp, &path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Io(e));
        }

        Ok(path)
    }

    /// Lists every payload in the store directory, sorted by key
    ///
    /// Files that do not follow the store's naming scheme are ignored.
    pub async fn inventory(&self) -> StoreResult<Vec<StoredEntry>> {
        let mut entries = Vec::new();

        let mut dir = match tokio::fs::read_dir(self.dir()).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(StoreError::Io(e)),
        };

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(key) = name.to_str().and_then(CacheKey::from_file_name) else {
                continue;
            };
            let meta = entry.metadata().await?;
            if meta.is_file() {
                entries.push(StoredEntry {
                    key,
                    bytes: meta.len(),
                });
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn key_lock(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.clone()).or_default().clone()
    }
}

/// A temporary file name no other writer in any process is using
fn tmp_name(key: &CacheKey) -> String {
    format!(
        "{}.{}.{}.tmp",
        key.file_name(),
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(tmp, bytes).await?;
    tokio::fs::rename(tmp, path).await
}
