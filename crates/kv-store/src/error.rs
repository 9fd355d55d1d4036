use thiserror::Error;

/// Errors that can occur when interacting with a key-value store.
#[derive(Debug, Error)]
pub enum KvStoreError {
    /// The key cannot be used by this store.
    #[error("Invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Reading or writing the underlying storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, KvStoreError>;
