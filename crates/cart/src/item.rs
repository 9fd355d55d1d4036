//! Cart line items.

use common::ProductId;
use serde::{Deserialize, Serialize};

/// A product to put into the cart.
///
/// Carries everything a `CartItem` does except the quantity, which the cart
/// owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewCartItem {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turns the product into a line item with the given quantity.
    pub fn with_quantity(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

/// One line of the cart.
///
/// Serialized with the fields `id`, `title`, `image_url`, `price` and
/// `quantity`; this is the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product identifier, unique within a cart.
    pub id: ProductId,

    /// Display name.
    pub title: String,

    /// Reference to a display image.
    pub image_url: String,

    /// Unit price. The currency is up to the caller.
    pub price: f64,

    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
}

impl CartItem {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        NewCartItem::new(id, title, image_url, price).with_quantity(quantity)
    }
}
