//! In-process key-value store
//!
//! Keeps values in a `HashMap` behind a mutex. Reads and writes can be
//! made to fail on demand, which is how tests exercise the store's
//! error propagation rules without a real broken disk.

use crate::error::{Result, TallyError};
use crate::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Volatile key-value store
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `value` already present under `key`
    ///
    /// # Examples
    ///
    /// ```
    /// use tallykeeper::storage::MemoryKeyValueStore;
    ///
    /// let store = MemoryKeyValueStore::with_entry("counter_sessions", b"not json".to_vec());
    /// assert_eq!(store.raw("counter_sessions").as_deref(), Some(&b"not json"[..]));
    /// ```
    pub fn with_entry(key: &str, value: Vec<u8>) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value);
        }
        store
    }

    /// Make every subsequent `get` fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current bytes under `key`, bypassing failure injection
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TallyError::Storage("Get failed: simulated read failure".into()).into());
        }
        let entries = self
            .entries
            .lock()
            .map_err(|_| TallyError::Storage("Get failed: store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(
                TallyError::Storage("Insert failed: simulated write failure".into()).into(),
            );
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TallyError::Storage("Insert failed: store lock poisoned".into()))?;
        entries.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
