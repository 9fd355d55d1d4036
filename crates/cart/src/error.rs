//! Cart error types.

use common::ProductId;
use kv_store::KvStoreError;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No cart entry has the requested product ID.
    #[error("Item not found: {id}")]
    ItemNotFound { id: ProductId },

    /// The product's price is NaN or infinite and cannot be persisted.
    #[error("Invalid price for item {id}: price must be a finite number")]
    InvalidPrice { id: ProductId },

    /// Incrementing would overflow the item's quantity.
    #[error("Quantity overflow for item {id}")]
    QuantityOverflow { id: ProductId },

    /// The persisted cart could not be used.
    #[error("Corrupt cart data under key {key:?}: {reason}")]
    CorruptData {
        key: String,
        #[source]
        reason: CorruptReason,
    },

    /// Reading or writing the key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KvStoreError),
}

/// Why a persisted cart was rejected.
#[derive(Debug, Error)]
pub enum CorruptReason {
    /// The stored value is not a JSON list of cart items.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two stored entries share a product ID.
    #[error("duplicate item {0}")]
    DuplicateId(ProductId),

    /// A stored entry has a quantity of zero.
    #[error("item {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
