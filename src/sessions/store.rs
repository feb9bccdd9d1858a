//! Session collection store
//!
//! Every operation reads the full collection from the key-value store,
//! works on it in memory and (for mutations) writes the full collection
//! back. Mutations hold an async mutex for the whole read-modify-write so
//! two in-flight mutations on the same store cannot lose each other's
//! writes. Separate processes sharing one database are still
//! last-writer-wins.
//!
//! Read failures are swallowed by [`SessionStore::list_summaries`] and
//! [`SessionStore::get_by_id`] (an unreadable collection looks empty)
//! unless strict reads are enabled. Use [`SessionStore::load_checked`] to
//! tell a corrupt store apart from an empty one.

use crate::error::{Result, TallyError};
use crate::sessions::{new_session_id, Session, SessionSummary};
use crate::storage::KeyValueStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage key the session collection lives under
pub const DEFAULT_STORAGE_KEY: &str = "counter_sessions";

/// Sole owner of persisted session state
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    strict_reads: bool,
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Create a store over `kv` using [`DEFAULT_STORAGE_KEY`]
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use tallykeeper::sessions::SessionStore;
    /// use tallykeeper::storage::MemoryKeyValueStore;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> tallykeeper::error::Result<()> {
    /// let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
    /// assert!(store.list_summaries().await?.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    /// Create a store over `kv` using a custom storage key
    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            strict_reads: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Surface unreadable data from `list_summaries`/`get_by_id` as errors
    pub fn with_strict_reads(mut self, strict: bool) -> Self {
        self.strict_reads = strict;
        self
    }

    /// Storage key in use
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Summaries of every stored session, in storage order
    ///
    /// Callers sort; see [`crate::sessions::sort_by_recent`].
    ///
    /// # Errors
    ///
    /// Only in strict mode: `TallyError::Storage` or
    /// `TallyError::CorruptData` when the collection cannot be read
    pub async fn list_summaries(&self) -> Result<Vec<SessionSummary>> {
        let sessions = self.load_for_read("loading sessions").await?;
        Ok(sessions.iter().map(SessionSummary::from).collect())
    }

    /// Look up one session by id
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no session has that id (or, outside strict mode,
    /// when the collection is unreadable)
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let sessions = self.load_for_read("loading session").await?;
        Ok(sessions.into_iter().find(|s| s.id == id))
    }

    /// Insert or replace a session
    ///
    /// A record with a matching id is replaced by `session` with
    /// `updated_at` stamped to now. Otherwise `session` is appended as-is;
    /// new records are expected to carry their own timestamps.
    ///
    /// # Returns
    ///
    /// The record exactly as written
    ///
    /// # Errors
    ///
    /// Returns an error if the existing collection cannot be read or the
    /// write fails. Nothing is written in either case.
    pub async fn upsert(&self, session: Session) -> Result<Session> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.read_collection().await.map_err(|e| {
            tracing::error!(error = %e, id = %session.id, "Error saving session");
            e
        })?;

        let stored = match sessions.iter().position(|s| s.id == session.id) {
            Some(index) => {
                let updated = Session {
                    updated_at: Utc::now(),
                    ..session
                };
                sessions[index] = updated.clone();
                tracing::debug!(id = %updated.id, "Replacing session");
                updated
            }
            None => {
                tracing::debug!(id = %session.id, "Appending session");
                sessions.push(session.clone());
                session
            }
        };

        self.write_collection(&sessions).await.map_err(|e| {
            tracing::error!(error = %e, id = %stored.id, "Error saving session");
            e
        })?;

        Ok(stored)
    }

    /// Remove the session with `id`, if present
    ///
    /// Deleting an unknown id is not an error. When nothing has ever been
    /// stored there is nothing to rewrite and no write happens.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing collection cannot be read or the
    /// write fails
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let raw = self.kv.get(&self.key).await.map_err(|e| {
            tracing::error!(error = %e, id, "Error deleting session");
            e
        })?;
        let Some(bytes) = raw else {
            return Ok(());
        };

        let sessions = decode_collection(&bytes).map_err(|e| {
            tracing::error!(error = %e, id, "Error deleting session");
            e
        })?;
        let before = sessions.len();
        let remaining: Vec<Session> = sessions.into_iter().filter(|s| s.id != id).collect();
        tracing::debug!(id, removed = before - remaining.len(), "Deleting session");

        self.write_collection(&remaining).await.map_err(|e| {
            tracing::error!(error = %e, id, "Error deleting session");
            e
        })
    }

    /// Generate an id for a new session
    ///
    /// Not checked against existing ids; uniqueness rests on UUID v4.
    pub fn generate_id(&self) -> String {
        new_session_id()
    }

    /// Read the full collection, surfacing every failure
    ///
    /// # Errors
    ///
    /// `TallyError::Storage` if the backend read fails,
    /// `TallyError::CorruptData` if the payload cannot be decoded
    pub async fn load_checked(&self) -> Result<Vec<Session>> {
        self.read_collection().await
    }

    async fn load_for_read(&self, context: &str) -> Result<Vec<Session>> {
        match self.read_collection().await {
            Ok(sessions) => Ok(sessions),
            Err(e) if self.strict_reads => Err(e),
            Err(e) => {
                tracing::error!(error = %e, "Error {}", context);
                Ok(Vec::new())
            }
        }
    }

    async fn read_collection(&self) -> Result<Vec<Session>> {
        match self.kv.get(&self.key).await? {
            Some(bytes) => decode_collection(&bytes),
            None => Ok(Vec::new()),
        }
    }

    async fn write_collection(&self, sessions: &[Session]) -> Result<()> {
        let bytes = serde_json::to_vec(sessions).map_err(TallyError::Serialization)?;
        self.kv.set(&self.key, bytes).await
    }
}

/// Decode a stored collection; an empty payload counts as no sessions
fn decode_collection(bytes: &[u8]) -> Result<Vec<Session>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes).map_err(|e| TallyError::CorruptData(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::tally_error;
    use crate::storage::MemoryKeyValueStore;
    use std::time::Duration;

    fn create_test_store() -> (SessionStore, Arc<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        (SessionStore::new(kv.clone()), kv)
    }

    fn new_session(name: &str) -> Session {
        Session::new(new_session_id(), name.to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_list_summaries_empty_when_nothing_stored() {
        let (store, _kv) = create_test_store();
        assert!(store.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_new_session_appends_as_is() {
        let (store, _kv) = create_test_store();
        let session = new_session("Laps");

        let stored = store.upsert(session.clone()).await.unwrap();
        assert_eq!(stored, session);

        let loaded = store.get_by_id(&session.id).await.unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_upsert_existing_session_restamps_updated_at() {
        let (store, _kv) = create_test_store();
        let session = new_session("Laps");
        store.upsert(session.clone()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let before_call = Utc::now();
        let mut changed = session.clone();
        changed.count = 5;
        let stored = store.upsert(changed).await.unwrap();

        assert_eq!(stored.count, 5);
        assert_eq!(stored.created_at, session.created_at);
        assert!(stored.updated_at >= before_call);
        assert!(stored.updated_at > session.updated_at);

        let loaded = store.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded, stored);
    }

    #[tokio::test]
    async fn test_upsert_ignores_caller_updated_at_on_replace() {
        let (store, _kv) = create_test_store();
        let session = new_session("Laps");
        store.upsert(session.clone()).await.unwrap();

        let mut stale = session.clone();
        stale.updated_at = session.updated_at - chrono::Duration::days(30);
        let stored = store.upsert(stale).await.unwrap();
        assert!(stored.updated_at >= session.updated_at);
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_record_per_id() {
        let (store, _kv) = create_test_store();
        let session = new_session("Laps");
        store.upsert(session.clone()).await.unwrap();
        store.upsert(session.clone()).await.unwrap();
        store.upsert(session).await.unwrap();

        assert_eq!(store.list_summaries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_write_failure_propagates_and_keeps_data() {
        let (store, kv) = create_test_store();
        let session = new_session("Laps");
        store.upsert(session.clone()).await.unwrap();
        let before = kv.raw(DEFAULT_STORAGE_KEY);

        kv.set_fail_writes(true);
        let mut changed = session.clone();
        changed.count = 9;
        let err = store.upsert(changed).await.unwrap_err();
        assert!(matches!(tally_error(&err), Some(TallyError::Storage(_))));

        kv.set_fail_writes(false);
        assert_eq!(kv.raw(DEFAULT_STORAGE_KEY), before);
        let loaded = store.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.count, 0);
    }

    #[tokio::test]
    async fn test_upsert_refuses_to_overwrite_corrupt_collection() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            b"{not json".to_vec(),
        ));
        let store = SessionStore::new(kv.clone());

        let err = store.upsert(new_session("Laps")).await.unwrap_err();
        assert!(matches!(tally_error(&err), Some(TallyError::CorruptData(_))));
        assert_eq!(kv.raw(DEFAULT_STORAGE_KEY).as_deref(), Some(&b"{not json"[..]));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_none() {
        let (store, _kv) = create_test_store();
        store.upsert(new_session("A")).await.unwrap();
        assert!(store.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_collection_reads_as_empty() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            b"[{\"id\": 3".to_vec(),
        ));
        let store = SessionStore::new(kv);

        assert!(store.list_summaries().await.unwrap().is_empty());
        assert!(store.get_by_id("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_backend_read_reads_as_empty() {
        let (store, kv) = create_test_store();
        store.upsert(new_session("A")).await.unwrap();

        kv.set_fail_reads(true);
        assert!(store.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strict_reads_surface_corruption() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            b"garbage".to_vec(),
        ));
        let store = SessionStore::new(kv).with_strict_reads(true);

        let err = store.list_summaries().await.unwrap_err();
        assert!(matches!(tally_error(&err), Some(TallyError::CorruptData(_))));
        assert!(store.get_by_id("x").await.is_err());
    }

    #[tokio::test]
    async fn test_load_checked_distinguishes_empty_from_corrupt() {
        let (store, _kv) = create_test_store();
        assert!(store.load_checked().await.unwrap().is_empty());

        let corrupt = SessionStore::new(Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            b"42".to_vec(),
        )));
        let err = corrupt.load_checked().await.unwrap_err();
        assert!(matches!(tally_error(&err), Some(TallyError::CorruptData(_))));
    }

    #[tokio::test]
    async fn test_empty_payload_is_empty_collection() {
        let store = SessionStore::new(Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            Vec::new(),
        )));
        assert!(store.load_checked().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_only_matching_record() {
        let (store, _kv) = create_test_store();
        let a = store.upsert(new_session("A")).await.unwrap();
        let b = store.upsert(new_session("B")).await.unwrap();

        store.delete_by_id(&a.id).await.unwrap();

        let summaries = store.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0], SessionSummary::from(&b));
    }

    #[tokio::test]
    async fn test_delete_without_stored_collection_does_not_write() {
        let (store, kv) = create_test_store();
        store.delete_by_id("missing").await.unwrap();
        assert_eq!(kv.write_count(), 0);
        assert!(kv.raw(DEFAULT_STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_rewrites_unchanged_collection() {
        let (store, kv) = create_test_store();
        let a = store.upsert(new_session("A")).await.unwrap();
        let writes = kv.write_count();

        store.delete_by_id("missing").await.unwrap();

        assert_eq!(kv.write_count(), writes + 1);
        let loaded = store.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(loaded, a);
    }

    #[tokio::test]
    async fn test_delete_write_failure_propagates() {
        let (store, kv) = create_test_store();
        let a = store.upsert(new_session("A")).await.unwrap();

        kv.set_fail_writes(true);
        assert!(store.delete_by_id(&a.id).await.is_err());

        kv.set_fail_writes(false);
        assert!(store.get_by_id(&a.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_do_not_lose_writes() {
        let (store, _kv) = create_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert(new_session(&format!("session {}", i)))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list_summaries().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = SessionStore::with_key(kv.clone(), "other_key");
        store.upsert(new_session("A")).await.unwrap();

        assert_eq!(store.key(), "other_key");
        assert!(kv.raw("other_key").is_some());
        assert!(kv.raw(DEFAULT_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_generate_id_produces_distinct_ids() {
        let (store, _kv) = create_test_store();
        assert_ne!(store.generate_id(), store.generate_id());
    }
}
