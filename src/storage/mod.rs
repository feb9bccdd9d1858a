//! Key-value storage port
//!
//! The session collection lives under a single key in a durable
//! key-value store. This module defines the [`KeyValueStore`] trait the
//! rest of the crate talks to, plus two implementations:
//!
//! - [`SledKeyValueStore`] -- embedded `sled` database on disk
//! - [`MemoryKeyValueStore`] -- in-process map, used by tests and for
//!   simulating read/write failures
//!
//! An absent key is not an error; it means nothing has been written yet.

use crate::error::Result;

pub mod memory;
pub mod sled_store;

pub use memory::MemoryKeyValueStore;
pub use sled_store::SledKeyValueStore;

/// Durable byte store addressed by string keys
///
/// Implementations must make `set` all-or-nothing from the caller's point
/// of view: either the new value is stored in full or an error is
/// returned and the previous value is still in place.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the key has never been written
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Storage` if the backend cannot be read
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Storage` if the value could not be persisted
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
}
