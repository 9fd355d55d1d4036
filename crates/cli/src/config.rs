//! CLI configuration loaded from environment variables.

use std::path::PathBuf;

use cart::{CartConfig, CorruptDataPolicy, DEFAULT_STORAGE_KEY};

use crate::error::CliError;

/// Default directory holding the persisted cart.
pub const DEFAULT_DATA_DIR: &str = ".cart";

/// CLI configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CART_DATA_DIR` — storage directory (default: `".cart"`)
/// - `CART_STORAGE_KEY` — key the cart is stored under (default: `"products"`)
/// - `CART_ON_CORRUPT` — `"fail"` or `"discard"` (default: `"fail"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub cart: CartConfig,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let on_corrupt = match lookup("CART_ON_CORRUPT") {
            Some(raw) => raw
                .parse::<CorruptDataPolicy>()
                .map_err(|e| CliError::InvalidConfig {
                    var: "CART_ON_CORRUPT",
                    reason: e.to_string(),
                })?,
            None => CorruptDataPolicy::default(),
        };

        let storage_key =
            lookup("CART_STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        kv_store::validate_key(&storage_key).map_err(|e| CliError::InvalidConfig {
            var: "CART_STORAGE_KEY",
            reason: e.to_string(),
        })?;

        Ok(Self {
            data_dir: lookup("CART_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            cart: CartConfig::new()
                .with_storage_key(storage_key)
                .with_corrupt_data_policy(on_corrupt),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: "info".to_string(),
            cart: CartConfig::default(),
        }
    }
}
