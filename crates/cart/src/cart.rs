//! The cart: an ordered list of line items, unique by product ID.

use std::collections::HashSet;

use common::ProductId;
use serde::Serialize;

use crate::error::{CartError, CorruptReason};
use crate::item::{CartItem, NewCartItem};

/// A change produced by a cart command.
///
/// Commands inspect the cart and return the change they would make; `apply`
/// performs it. Splitting the two lets the store persist the next state before
/// committing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CartChange {
    /// A product was put into the cart with quantity 1.
    Added(CartItem),

    /// An existing line changed quantity.
    QuantityChanged { id: ProductId, from: u32, to: u32 },

    /// A line was removed. Carries the line as it was before removal.
    Removed(CartItem),
}

impl CartChange {
    /// Returns the product the change is about.
    pub fn id(&self) -> &ProductId {
        match self {
            CartChange::Added(item) | CartChange::Removed(item) => &item.id,
            CartChange::QuantityChanged { id, .. } => id,
        }
    }

    /// Returns the change name.
    pub fn change_type(&self) -> &'static str {
        match self {
            CartChange::Added(_) => "Added",
            CartChange::QuantityChanged { .. } => "QuantityChanged",
            CartChange::Removed(_) => "Removed",
        }
    }
}

/// Cart state.
///
/// Items keep the order in which they were first added. No two items share an
/// ID and every quantity is at least 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

// Query methods
impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from previously persisted items, checking its invariants.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CorruptReason> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(CorruptReason::ZeroQuantity(item.id.clone()));
            }
            if !seen.insert(&item.id) {
                return Err(CorruptReason::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Returns all items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the item with the given ID.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns the number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn existing(&self, id: &str) -> Result<&CartItem, CartError> {
        self.get(id).ok_or_else(|| CartError::ItemNotFound {
            id: ProductId::new(id),
        })
    }
}

// Command methods (return changes)
impl Cart {
    /// Adds a product.
    ///
    /// A product already in the cart gets its quantity bumped; its stored
    /// title, image and price are kept. Prices must be finite.
    pub fn add_to_cart(&self, product: NewCartItem) -> Result<CartChange, CartError> {
        if !product.price.is_finite() {
            return Err(CartError::InvalidPrice { id: product.id });
        }
        match self.get(product.id.as_str()) {
            Some(existing) => Self::bumped(existing),
            None => Ok(CartChange::Added(product.with_quantity(1))),
        }
    }

    /// Increments the quantity of an item already in the cart.
    pub fn increment(&self, id: &str) -> Result<CartChange, CartError> {
        Self::bumped(self.existing(id)?)
    }

    /// Decrements the quantity of an item, removing it when it reaches zero.
    pub fn decrement(&self, id: &str) -> Result<CartChange, CartError> {
        let existing = self.existing(id)?;
        if existing.quantity > 1 {
            Ok(CartChange::QuantityChanged {
                id: existing.id.clone(),
                from: existing.quantity,
                to: existing.quantity - 1,
            })
        } else {
            Ok(CartChange::Removed(existing.clone()))
        }
    }

    fn bumped(existing: &CartItem) -> Result<CartChange, CartError> {
        let to = existing
            .quantity
            .checked_add(1)
            .ok_or_else(|| CartError::QuantityOverflow {
                id: existing.id.clone(),
            })?;
        Ok(CartChange::QuantityChanged {
            id: existing.id.clone(),
            from: existing.quantity,
            to,
        })
    }
}

// Apply
impl Cart {
    /// Applies a change produced by one of the command methods.
    pub fn apply(&mut self, change: CartChange) {
        match change {
            CartChange::Added(item) => {
                if self.position(item.id.as_str()).is_none() {
                    self.items.push(item);
                }
            }
            CartChange::QuantityChanged { id, to, .. } => {
                if let Some(index) = self.position(id.as_str()) {
                    if to == 0 {
                        self.items.remove(index);
                    } else {
                        self.items[index].quantity = to;
                    }
                }
            }
            CartChange::Removed(item) => {
                if let Some(index) = self.position(item.id.as_str()) {
                    self.items.remove(index);
                }
            }
        }
    }
}
