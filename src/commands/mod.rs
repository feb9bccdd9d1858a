/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `sessions` -- list, create, show and change sessions through the screens
- `verify`   -- check the stored collection can be read

Handlers are thin: they open the store described by the configuration,
drive a screen controller and print the result.
*/

use crate::config::Config;
use crate::error::Result;
use crate::sessions::SessionStore;
use crate::storage::SledKeyValueStore;
use std::sync::Arc;

pub mod sessions;
pub mod verify;

/// Open the session store described by `config`
///
/// # Errors
///
/// Returns `TallyError::Storage` if the database cannot be opened
pub fn open_store(config: &Config) -> Result<Arc<SessionStore>> {
    let kv = SledKeyValueStore::open(config.storage.path.clone())?;
    let store = SessionStore::with_key(Arc::new(kv), config.storage.key.clone())
        .with_strict_reads(config.storage.strict_reads);
    Ok(Arc::new(store))
}

/// Resolve a user-typed id, accepting a unique prefix of a stored id
///
/// Returns the input unchanged when it matches exactly, matches nothing
/// or is ambiguous, so the caller's lookup reports the problem.
pub async fn resolve_id(store: &SessionStore, input: &str) -> String {
    let Ok(summaries) = store.list_summaries().await else {
        return input.to_string();
    };
    if summaries.iter().any(|s| s.id == input) {
        return input.to_string();
    }

    let mut matches = summaries.iter().filter(|s| s.id.starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(only), None) if !input.is_empty() => only.id.clone(),
        _ => input.to_string(),
    }
}
