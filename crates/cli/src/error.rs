//! CLI error types.

use cart::CartError;
use kv_store::KvStoreError;
use thiserror::Error;

/// Errors surfaced by the `cart` command.
#[derive(Debug, Error)]
pub enum CliError {
    /// An environment variable holds an unusable value.
    #[error("Invalid {var}: {reason}")]
    InvalidConfig { var: &'static str, reason: String },

    /// Opening the storage directory failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KvStoreError),

    /// The cart rejected the operation.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The result could not be rendered.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
