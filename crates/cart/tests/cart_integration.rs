//! Integration tests for the cart store.
//!
//! These tests cover persistence across restarts, failure handling of the
//! key-value store, and concurrent mutations through shared handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cart::{
    CartChange, CartConfig, CartError, CartItem, CartStore, CorruptDataPolicy, CorruptReason,
    NewCartItem, ProductId,
};
use kv_store::{FileKvStore, InMemoryKvStore, KeyValueStore, KvStoreError};

fn shirt() -> NewCartItem {
    NewCartItem::new("p1", "Shirt", "u", 10.0)
}

fn hat() -> NewCartItem {
    NewCartItem::new("p2", "Hat", "v", 4.5)
}

/// Store wrapper whose writes can be switched off.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: InMemoryKvStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> kv_store::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> kv_store::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvStoreError::Io(std::io::Error::other("storage full")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> kv_store::Result<()> {
        self.inner.remove(key).await
    }
}

/// Store whose reads always fail.
struct UnreadableStore;

#[async_trait]
impl KeyValueStore for UnreadableStore {
    async fn get(&self, _key: &str) -> kv_store::Result<Option<String>> {
        Err(KvStoreError::Io(std::io::Error::other("device locked")))
    }

    async fn set(&self, _key: &str, _value: String) -> kv_store::Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> kv_store::Result<()> {
        Ok(())
    }
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn add_to_empty_cart() {
        let cart = CartStore::open_default(InMemoryKvStore::new()).await.unwrap();

        let change = cart.add_to_cart(shirt()).await.unwrap();

        assert_eq!(change, CartChange::Added(shirt().with_quantity(1)));
        assert_eq!(
            cart.products(),
            vec![CartItem::new("p1", "Shirt", "u", 10.0, 1)]
        );
    }

    #[tokio::test]
    async fn increment_from_one_to_two() {
        let cart = CartStore::open_default(InMemoryKvStore::new()).await.unwrap();
        cart.add_to_cart(shirt()).await.unwrap();

        let change = cart.increment("p1").await.unwrap();

        assert_eq!(
            change,
            CartChange::QuantityChanged {
                id: ProductId::new("p1"),
                from: 1,
                to: 2
            }
        );
        assert_eq!(cart.products(), vec![shirt().with_quantity(2)]);
    }

    #[tokio::test]
    async fn decrement_down_to_removal() {
        let cart = CartStore::open_default(InMemoryKvStore::new()).await.unwrap();
        cart.add_to_cart(shirt()).await.unwrap();
        cart.increment("p1").await.unwrap();

        cart.decrement("p1").await.unwrap();
        assert_eq!(cart.products(), vec![shirt().with_quantity(1)]);

        let change = cart.decrement("p1").await.unwrap();
        assert_eq!(change, CartChange::Removed(shirt().with_quantity(1)));
        assert!(cart.products().is_empty());
    }

    #[tokio::test]
    async fn restart_reloads_persisted_cart() {
        let kv = InMemoryKvStore::new();
        {
            let cart = CartStore::open_default(kv.clone()).await.unwrap();
            cart.add_to_cart(shirt()).await.unwrap();
        }

        let reopened = CartStore::open_default(kv).await.unwrap();
        assert_eq!(reopened.products(), vec![shirt().with_quantity(1)]);
    }

    #[tokio::test]
    async fn loads_cart_written_in_the_persisted_layout() {
        let kv = InMemoryKvStore::new();
        kv.set(
            "products",
            r#"[{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":1},
                {"id":"p2","title":"Hat","image_url":"v","price":4.5,"quantity":3}]"#
                .to_string(),
        )
        .await
        .unwrap();

        let cart = CartStore::open_default(kv).await.unwrap();

        assert_eq!(
            cart.products(),
            vec![shirt().with_quantity(1), hat().with_quantity(3)]
        );
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn every_mutation_roundtrips_through_storage() {
        let kv = InMemoryKvStore::new();
        let cart = CartStore::open_default(kv.clone()).await.unwrap();

        cart.add_to_cart(shirt()).await.unwrap();
        cart.add_to_cart(hat()).await.unwrap();
        cart.add_to_cart(shirt()).await.unwrap();
        cart.increment("p2").await.unwrap();
        cart.decrement("p1").await.unwrap();
        cart.decrement("p2").await.unwrap();

        let reloaded = CartStore::open_default(kv).await.unwrap();
        assert_eq!(reloaded.products(), cart.products());
        assert_eq!(
            cart.products(),
            vec![shirt().with_quantity(1), hat().with_quantity(1)]
        );
    }

    #[tokio::test]
    async fn awkward_fields_roundtrip_through_storage() {
        let products = [
            NewCartItem::new("large", "Yacht", "u", f64::MAX),
            NewCartItem::new("tiny", "Grain", "u", 1e-300),
            NewCartItem::new("sum", "Bundle", "u", 0.1 + 0.2),
            NewCartItem::new("zero", "Free sample", "u", 0.0),
            NewCartItem::new("商品-ü", "Tee — ünïcödé 👕", "https://example.com/👕.png", 12.5),
            NewCartItem::new("quote\"id", r#"He said "hi" \ bye"#, "line\nbreak", 3.0),
            NewCartItem::new("blank", "", "", 1.0),
        ];

        let kv = InMemoryKvStore::new();
        let cart = CartStore::open_default(kv.clone()).await.unwrap();
        for product in &products {
            cart.add_to_cart(product.clone()).await.unwrap();
        }
        cart.add_to_cart(products[4].clone()).await.unwrap();

        let reloaded = CartStore::open_default(kv).await.unwrap();
        assert_eq!(reloaded.products(), cart.products());
        assert_eq!(reloaded.len(), products.len());
        assert_eq!(reloaded.get("商品-ü").unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn non_finite_price_is_rejected_without_writing() {
        let kv = InMemoryKvStore::new();
        let cart = CartStore::open_default(kv.clone()).await.unwrap();
        cart.add_to_cart(shirt()).await.unwrap();
        let stored = kv.get("products").await.unwrap();

        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = cart
                .add_to_cart(NewCartItem::new("p9", "Broken", "u", price))
                .await;
            assert!(matches!(result, Err(CartError::InvalidPrice { .. })));
        }

        assert_eq!(cart.products(), vec![shirt().with_quantity(1)]);
        assert_eq!(kv.get("products").await.unwrap(), stored);

        let reloaded = CartStore::open_default(kv).await.unwrap();
        assert_eq!(reloaded.products(), cart.products());
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let kv = FlakyStore::default();
        let cart = CartStore::open_default(kv.clone()).await.unwrap();
        cart.add_to_cart(shirt()).await.unwrap();

        kv.fail_writes(true);
        let result = cart.increment("p1").await;
        assert!(matches!(result, Err(CartError::Storage(KvStoreError::Io(_)))));
        assert_eq!(cart.products(), vec![shirt().with_quantity(1)]);

        let result = cart.add_to_cart(hat()).await;
        assert!(matches!(result, Err(CartError::Storage(_))));
        assert_eq!(cart.len(), 1);

        kv.fail_writes(false);
        cart.increment("p1").await.unwrap();
        assert_eq!(cart.get("p1").unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn failed_write_does_not_notify_subscribers() {
        let kv = FlakyStore::default();
        let cart = CartStore::open_default(kv.clone()).await.unwrap();
        let rx = cart.subscribe();

        kv.fail_writes(true);
        assert!(cart.add_to_cart(shirt()).await.is_err());

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn unreadable_storage_fails_open() {
        let result = CartStore::open_default(UnreadableStore).await;
        assert!(matches!(result, Err(CartError::Storage(KvStoreError::Io(_)))));
    }

    #[tokio::test]
    async fn file_backed_cart_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        {
            let kv = FileKvStore::open(dir.path()).await.unwrap();
            let cart = CartStore::open_default(kv).await.unwrap();
            cart.add_to_cart(shirt()).await.unwrap();
            cart.add_to_cart(hat()).await.unwrap();
            cart.decrement("p2").await.unwrap();
        }

        let kv = FileKvStore::open(dir.path()).await.unwrap();
        let cart = CartStore::open_default(kv).await.unwrap();
        assert_eq!(cart.products(), vec![shirt().with_quantity(1)]);
    }
}

mod corrupt_data {
    use super::*;

    async fn store_with(raw: &str) -> InMemoryKvStore {
        let kv = InMemoryKvStore::new();
        kv.set("products", raw.to_string()).await.unwrap();
        kv
    }

    #[tokio::test]
    async fn invalid_json_fails_by_default() {
        let kv = store_with("{not json").await;

        let result = CartStore::open_default(kv).await;
        assert!(matches!(
            result,
            Err(CartError::CorruptData {
                reason: CorruptReason::Json(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn wrong_shape_fails_by_default() {
        let kv = store_with(r#"{"id":"p1"}"#).await;

        let result = CartStore::open_default(kv).await;
        assert!(matches!(result, Err(CartError::CorruptData { .. })));
    }

    #[tokio::test]
    async fn duplicate_ids_are_corrupt() {
        let kv = store_with(
            r#"[{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":1},
                {"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":2}]"#,
        )
        .await;

        let result = CartStore::open_default(kv).await;
        assert!(matches!(
            result,
            Err(CartError::CorruptData {
                reason: CorruptReason::DuplicateId(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn zero_quantity_is_corrupt() {
        let kv = store_with(
            r#"[{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":0}]"#,
        )
        .await;

        let result = CartStore::open_default(kv).await;
        assert!(matches!(
            result,
            Err(CartError::CorruptData {
                reason: CorruptReason::ZeroQuantity(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn discard_policy_starts_empty_and_overwrites_on_next_write() {
        let kv = store_with("garbage").await;
        let config = CartConfig::new().with_corrupt_data_policy(CorruptDataPolicy::Discard);

        let cart = CartStore::open(kv.clone(), config).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(kv.get("products").await.unwrap().as_deref(), Some("garbage"));

        cart.add_to_cart(shirt()).await.unwrap();
        let reloaded = CartStore::open_default(kv).await.unwrap();
        assert_eq!(reloaded.products(), vec![shirt().with_quantity(1)]);
    }
}

mod invariants {
    use super::*;

    #[tokio::test]
    async fn ids_stay_unique_and_quantities_positive() {
        let cart = CartStore::open_default(InMemoryKvStore::new()).await.unwrap();
        let products = [
            NewCartItem::new("a", "A", "ua", 1.0),
            NewCartItem::new("b", "B", "ub", 2.0),
            NewCartItem::new("c", "C", "uc", 3.0),
        ];

        // Deterministic mix of operations, including misses on removed ids.
        for step in 0..120usize {
            let product = &products[step % products.len()];
            let id = product.id.as_str();
            let outcome = match step % 5 {
                0 | 3 => cart.add_to_cart(product.clone()).await,
                1 => cart.increment(id).await,
                _ => cart.decrement(id).await,
            };
            if let Err(e) = outcome {
                assert!(matches!(e, CartError::ItemNotFound { .. }));
            }

            let items = cart.products();
            let mut ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), items.len());
            assert!(items.iter().all(|i| i.quantity >= 1));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_not_lost() {
        let kv = InMemoryKvStore::new();
        let cart = CartStore::open_default(kv.clone()).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let handle = cart.clone();
            tasks.push(tokio::spawn(async move {
                handle.add_to_cart(shirt()).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(cart.get("p1").unwrap().quantity, 50);
        let reloaded = CartStore::open_default(kv).await.unwrap();
        assert_eq!(reloaded.products(), cart.products());
    }
}
