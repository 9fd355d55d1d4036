//! Cart store: the persisted, shared cart handle.

use std::sync::Arc;

use kv_store::{KeyValueStore, KeyValueStoreExt, KvStoreError};
use tokio::sync::{Mutex, watch};

use crate::cart::{Cart, CartChange};
use crate::config::{CartConfig, CorruptDataPolicy};
use crate::error::{CartError, CorruptReason, Result};
use crate::item::{CartItem, NewCartItem};

/// Shared handle to a persisted cart.
///
/// A handle only exists once the cart has been loaded from storage, so
/// consumers never see a half-initialized cart. Clones are cheap and all of
/// them see the same state.
///
/// Every mutation runs under a lock: the next state is computed, written to
/// the key-value store, and only then committed in memory and broadcast to
/// subscribers. A failed write leaves the in-memory cart as it was.
pub struct CartStore<S: KeyValueStore> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    config: CartConfig,
    cart: Mutex<Cart>,
    products: watch::Sender<Vec<CartItem>>,
}

impl<S: KeyValueStore> Clone for CartStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Loads the cart from `store` and returns a handle to it.
    ///
    /// A missing value yields an empty cart. Malformed data is handled
    /// according to `config.on_corrupt`.
    #[tracing::instrument(skip(store, config), fields(key = %config.storage_key))]
    pub async fn open(store: S, config: CartConfig) -> Result<Self> {
        let cart = load_cart(&store, &config).await?;
        tracing::info!(items = cart.len(), "cart loaded");

        let (products, _) = watch::channel(cart.items().to_vec());
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                config,
                cart: Mutex::new(cart),
                products,
            }),
        })
    }

    /// Loads the cart with the default configuration.
    pub async fn open_default(store: S) -> Result<Self> {
        Self::open(store, CartConfig::default()).await
    }

    /// Returns the configuration the store was opened with.
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.inner.store
    }

    /// Returns the current items in insertion order.
    pub fn products(&self) -> Vec<CartItem> {
        self.inner.products.borrow().clone()
    }

    /// Returns the item with the given ID.
    pub fn get(&self, id: &str) -> Option<CartItem> {
        self.inner
            .products
            .borrow()
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Returns the number of distinct items.
    pub fn len(&self) -> usize {
        self.inner.products.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.products.borrow().is_empty()
    }

    /// Returns the sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.inner
            .products
            .borrow()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Subscribes to the item list.
    ///
    /// The receiver holds the current list and is notified after every
    /// committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.inner.products.subscribe()
    }

    /// Adds a product, or bumps its quantity if it is already in the cart.
    #[tracing::instrument(skip(self, product), fields(id = %product.id))]
    pub async fn add_to_cart(&self, product: NewCartItem) -> Result<CartChange> {
        self.mutate("add", |cart| cart.add_to_cart(product)).await
    }

    /// Increments the quantity of an item in the cart.
    ///
    /// Fails with `CartError::ItemNotFound` when no item has this ID.
    #[tracing::instrument(skip(self))]
    pub async fn increment(&self, id: &str) -> Result<CartChange> {
        self.mutate("increment", |cart| cart.increment(id)).await
    }

    /// Decrements the quantity of an item, removing it at zero.
    ///
    /// Fails with `CartError::ItemNotFound` when no item has this ID.
    #[tracing::instrument(skip(self))]
    pub async fn decrement(&self, id: &str) -> Result<CartChange> {
        self.mutate("decrement", |cart| cart.decrement(id)).await
    }

    async fn mutate<F>(&self, operation: &'static str, command: F) -> Result<CartChange>
    where
        F: FnOnce(&Cart) -> Result<CartChange>,
    {
        let mut cart = self.inner.cart.lock().await;

        let change = command(&cart)?;
        let mut next = cart.clone();
        next.apply(change.clone());

        if let Err(e) = self
            .inner
            .store
            .set_json(&self.inner.config.storage_key, next.items())
            .await
        {
            metrics::counter!("cart_persist_failures_total").increment(1);
            tracing::warn!(error = %e, operation, "failed to persist cart, keeping previous state");
            return Err(e.into());
        }

        *cart = next;
        self.inner.products.send_replace(cart.items().to_vec());

        metrics::counter!("cart_mutations_total", "operation" => operation).increment(1);
        tracing::debug!(
            operation,
            change = change.change_type(),
            id = %change.id(),
            items = cart.len(),
            "cart updated"
        );

        Ok(change)
    }
}

async fn load_cart<S: KeyValueStore>(store: &S, config: &CartConfig) -> Result<Cart> {
    let key = &config.storage_key;

    let loaded = match store.get_json::<Vec<CartItem>>(key).await {
        Ok(Some(items)) => Cart::from_items(items),
        Ok(None) => {
            tracing::debug!("no stored cart, starting empty");
            return Ok(Cart::new());
        }
        Err(KvStoreError::Serialization(e)) => Err(CorruptReason::Json(e)),
        Err(e) => return Err(e.into()),
    };

    match loaded {
        Ok(cart) => Ok(cart),
        Err(reason) => {
            metrics::counter!("cart_corrupt_loads_total").increment(1);
            match config.on_corrupt {
                CorruptDataPolicy::Fail => Err(CartError::CorruptData {
                    key: key.clone(),
                    reason,
                }),
                CorruptDataPolicy::Discard => {
                    tracing::warn!(%reason, "discarding corrupt stored cart");
                    Ok(Cart::new())
                }
            }
        }
    }
}
