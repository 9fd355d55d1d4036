//! Shopping cart store.
//!
//! This crate provides:
//! - `CartItem` / `NewCartItem` value types
//! - `Cart`, the ordered, id-unique list of line items and its mutations
//! - `CartStore`, a clonable handle that loads the cart from a key-value
//!   store, persists it after every mutation and broadcasts the current list

pub mod cart;
pub mod config;
pub mod error;
pub mod item;
pub mod store;

pub use cart::{Cart, CartChange};
pub use common::ProductId;
pub use config::{CartConfig, CorruptDataPolicy, DEFAULT_STORAGE_KEY, ParsePolicyError};
pub use error::{CartError, CorruptReason, Result};
pub use item::{CartItem, NewCartItem};
pub use store::CartStore;
