//! Cart store configuration.

use std::str::FromStr;

use thiserror::Error;

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "products";

/// What to do when the persisted cart cannot be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptDataPolicy {
    /// Refuse to open the store.
    #[default]
    Fail,

    /// Start with an empty cart. The stored value is overwritten by the next
    /// successful mutation.
    Discard,
}

impl CorruptDataPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptDataPolicy::Fail => "fail",
            CorruptDataPolicy::Discard => "discard",
        }
    }
}

impl std::fmt::Display for CorruptDataPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown corrupt data policy {0:?} (expected \"fail\" or \"discard\")")]
pub struct ParsePolicyError(pub String);

impl FromStr for CorruptDataPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(CorruptDataPolicy::Fail),
            "discard" => Ok(CorruptDataPolicy::Discard),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Cart store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the whole cart is persisted under.
    pub storage_key: String,

    /// Handling of malformed persisted data at load time.
    pub on_corrupt: CorruptDataPolicy,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_corrupt_data_policy(mut self, policy: CorruptDataPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            on_corrupt: CorruptDataPolicy::default(),
        }
    }
}
