//! Error taxonomy for table management.
use thiserror::Error;

/// Result type for every table and storage operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by descriptors, scopes, and table operations.
///
/// Nothing is retried. Storage failures carry the engine's error unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// A table declaration is missing its name or columns, or is inconsistent.
    #[error("invalid table declaration: {0}")]
    Config(String),

    /// A batch does not fit the declared schema; nothing was written.
    #[error("batch does not match the declared schema: {0}")]
    Validation(String),

    /// A database file or table that must already exist does not.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any failure reported by SQLite.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure around the storage directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
