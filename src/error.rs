//! Error types for Tallykeeper
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Tallykeeper operations
///
/// Each variant maps to one category of failure a caller may want to
/// react to differently: a missing session sends the user back, a
/// validation failure re-prompts, a storage failure is reported and the
/// in-memory state is left alone.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value storage errors (open, read, write, flush)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The persisted session collection could not be decoded
    #[error("Corrupt session data: {0}")]
    CorruptData(String),

    /// Requested session does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// User input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Access to the image library was refused
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Image decoding, cropping or encoding failed
    #[error("Image error: {0}")]
    Image(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Tallykeeper operations
///
/// Uses `anyhow::Error` so context can be attached while propagating;
/// callers that care about the category downcast to [`TallyError`].
pub type Result<T> = anyhow::Result<T>;

/// Returns the [`TallyError`] carried by an `anyhow::Error`, if any
pub fn tally_error(err: &anyhow::Error) -> Option<&TallyError> {
    err.downcast_ref::<TallyError>()
}
