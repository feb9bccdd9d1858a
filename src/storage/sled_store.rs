//! Embedded on-disk key-value store backed by `sled`

use crate::error::{Result, TallyError};
use crate::storage::KeyValueStore;
use sled::{Db, IVec};
use std::path::{Path, PathBuf};

/// Key-value store persisted in a `sled` database directory
///
/// Every `set` is flushed before returning, so a successful write
/// survives a crash immediately afterwards.
pub struct SledKeyValueStore {
    db: Db,
    path: PathBuf,
}

impl SledKeyValueStore {
    /// Open or create a store at `path`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Storage` if the directory cannot be created
    /// or the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use tallykeeper::storage::SledKeyValueStore;
    ///
    /// # fn main() -> tallykeeper::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledKeyValueStore::open(dir.path().join("sessions.db"))?;
    /// assert!(store.path().ends_with("sessions.db"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TallyError::Storage(format!(
                    "Failed to create parent directory for database: {}",
                    e
                ))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| TallyError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!(path = %path.display(), "Opened session database");

        Ok(Self { db, path })
    }

    /// Location of the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SledKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| TallyError::Storage(format!("Get failed: {}", e)))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let previous = self
            .db
            .insert(key.as_bytes(), value)
            .map_err(|e| TallyError::Storage(format!("Insert failed: {}", e)))?;

        if let Err(e) = self.db.flush_async().await {
            // The insert is already visible to readers; put the old value back
            if let Err(restore_err) = self.restore(key, previous) {
                tracing::error!(key, error = %restore_err, "Failed to restore value after flush error");
            }
            return Err(TallyError::Storage(format!("Flush failed: {}", e)).into());
        }

        Ok(())
    }
}

impl SledKeyValueStore {
    /// Reinstate `previous` under `key`, removing the key if it had no value
    fn restore(&self, key: &str, previous: Option<IVec>) -> Result<()> {
        let outcome = match previous {
            Some(bytes) => self.db.insert(key.as_bytes(), bytes).map(|_| ()),
            None => self.db.remove(key.as_bytes()).map(|_| ()),
        };
        outcome.map_err(|e| TallyError::Storage(format!("Restore failed: {}", e)).into())
    }
}
