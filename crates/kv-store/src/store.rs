use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{KvStoreError, Result};

/// Core trait for key-value store implementations.
///
/// A store maps string keys to string values and survives for as long as its
/// backing medium does. All implementations must be thread-safe (Send + Sync).
///
/// Backends may restrict the keys they accept: `FileKvStore` only takes keys
/// that pass `validate_key` and returns `KvStoreError::InvalidKey` otherwise.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes the value stored under `key`.
    ///
    /// Removing a key that holds no value is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Extension trait providing JSON helpers for key-value stores.
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Reads and deserializes the JSON value stored under `key`.
    ///
    /// Malformed values surface as `KvStoreError::Serialization`.
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serializes `value` as JSON and stores it under `key`.
    async fn set_json<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }

    /// Checks if a value is stored under `key`.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

// Blanket implementation for all KeyValueStore implementations
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}

/// Validates a key for backends that map keys onto file names.
///
/// Keys must be non-empty, must not start with `.`, and may only contain
/// ASCII letters, digits, `_`, `-` and `.` so they map onto file names.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvStoreError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }

    if key.starts_with('.') {
        return Err(KvStoreError::InvalidKey {
            key: key.to_string(),
            reason: "key must not start with '.'",
        });
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(KvStoreError::InvalidKey {
            key: key.to_string(),
            reason: "key may only contain ASCII letters, digits, '_', '-' and '.'",
        });
    }

    Ok(())
}
