//! Common error types for WBS sync

use thiserror::Error;

/// Common result type for WBS sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the sync pipeline
///
/// Malformed or missing record properties are not represented here: they
/// degrade to `None`/sentinel defaults inside the property normalizer and
/// item builder, so a single bad field never fails a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error (raised before any network call)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database is missing or the integration is not authorized for it
    #[error("Cannot access database {database_id}: {message}")]
    Access {
        database_id: String,
        message: String,
    },

    /// HTTP transport error (wraps reqwest::Error)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot or fingerprint write failure; the previous snapshot on disk
    /// is left untouched
    #[error("Persistence error: {0}")]
    Persistence(String),
}
