//! Storage error types.

use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store cannot be used (disabled, full, private mode).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem failure in a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters the store cannot represent.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}
