//! Tallykeeper - named counters with an optional reference photo
//!
//! This library provides the pieces behind the `tallykeeper` binary:
//! a persisted collection of counter sessions, the list and detail
//! screen controllers that drive it, and the prompt and image-picking
//! collaborators those screens call out to.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Key-value persistence port with sled and in-memory backends
//! - `sessions`: Session records and the store that reads and writes them
//! - `screens`: List and detail screen state machines
//! - `picker`: Image picking, cropping and re-encoding
//! - `prompt`: Confirmation dialogs and line input
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tallykeeper::storage::MemoryKeyValueStore;
//! use tallykeeper::screens::ListScreen;
//! use tallykeeper::SessionStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SessionStore::new(Arc::new(MemoryKeyValueStore::new())));
//!     let mut screen = ListScreen::new(store, 50);
//!     screen.create("Laps").await?;
//!     screen.refresh().await;
//!     assert_eq!(screen.sessions().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod picker;
pub mod prompt;
pub mod screens;
pub mod sessions;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TallyError};
pub use sessions::{Session, SessionStore, SessionSummary};
