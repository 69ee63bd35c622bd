mod common;

use std::sync::Arc;

use common::{memory_scope, product, shoe, temp_file_store, test_store_config};
use gomarket_cart::cart::InvalidProduct;
use gomarket_cart::shutdown::StorePhase;
use gomarket_cart::snapshot::{self, CART_STORAGE_KEY};
use gomarket_cart::storage::{KeyValueStore, MemoryStore};
use gomarket_cart::store::{CartScope, MutationOutcome, Persistence, StoreError};

#[tokio::test]
async fn walkthrough_through_the_store() {
    let (storage, scope) = memory_scope();
    let cart = scope.handle();

    let outcome = cart.add_to_cart(shoe()).await.unwrap();
    assert_eq!(
        outcome,
        MutationOutcome::Applied {
            id: "a".to_string(),
            quantity: 1,
            persistence: Persistence::Flushed,
        }
    );
    assert_eq!(cart.add_to_cart(shoe()).await.unwrap().quantity(), Some(2));
    assert_eq!(cart.decrement("a").await.unwrap().quantity(), Some(1));
    assert_eq!(cart.decrement("a").await.unwrap().quantity(), Some(0));
    assert_eq!(cart.decrement("a").await.unwrap().quantity(), Some(0));

    let products = cart.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products.quantity_of("a"), Some(0));

    let persisted = snapshot::decode(&storage.peek(CART_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(persisted, products);

    scope.close().await;
}

#[tokio::test]
async fn increment_missing_id_on_empty_cart_does_not_fail() {
    let (_storage, scope) = memory_scope();
    let outcome = scope.handle().increment("missing-id").await.unwrap();
    assert_eq!(outcome.quantity(), None);
    assert!(scope.handle().products().await.unwrap().is_empty());
    scope.close().await;
}

#[tokio::test]
async fn snapshot_is_always_the_full_cart() {
    let (storage, scope) = memory_scope();
    let cart = scope.handle();

    cart.add_to_cart(product("a", "Shoe", 10.0)).await.unwrap();
    cart.add_to_cart(product("b", "Sock", 2.5)).await.unwrap();
    cart.increment("a").await.unwrap();

    let persisted = snapshot::decode(&storage.peek(CART_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted.quantity_of("a"), Some(2));
    assert_eq!(persisted.quantity_of("b"), Some(1));

    scope.close().await;
}

#[tokio::test]
async fn cart_survives_restart_on_disk() {
    let (_temp_dir, file_store) = temp_file_store();

    let scope = CartScope::spawn(Arc::new(file_store.clone()), test_store_config());
    let cart = scope.handle();
    cart.add_to_cart(product("a", "Shoe", 10.0)).await.unwrap();
    cart.add_to_cart(product("b", "Sock", 2.5)).await.unwrap();
    cart.add_to_cart(product("a", "Shoe", 10.0)).await.unwrap();
    let before = scope.close().await.expect("store task");

    let scope = CartScope::spawn(Arc::new(file_store), test_store_config());
    let after = scope.handle().products().await.unwrap();
    assert_eq!(after, before);
    let ids: Vec<_> = after.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    scope.close().await;
}

#[tokio::test]
async fn cart_survives_restart_after_empty_id_is_refused() {
    let (_temp_dir, file_store) = temp_file_store();

    let scope = CartScope::spawn(Arc::new(file_store.clone()), test_store_config());
    let cart = scope.handle();
    cart.add_to_cart(shoe()).await.unwrap();
    let outcome = cart.add_to_cart(product("", "Nameless", 1.0)).await.unwrap();
    assert_eq!(
        outcome,
        MutationOutcome::Rejected {
            id: String::new(),
            reason: InvalidProduct::EmptyId,
        }
    );
    let before = scope.close().await.expect("store task");
    assert_eq!(before.len(), 1);

    let scope = CartScope::spawn(Arc::new(file_store), test_store_config());
    assert_eq!(scope.handle().products().await.unwrap(), before);
    scope.close().await;
}

#[tokio::test]
async fn cart_survives_restart_after_non_finite_price_is_refused() {
    let (storage, scope) = memory_scope();
    let cart = scope.handle();
    cart.add_to_cart(shoe()).await.unwrap();
    for price in [f64::NAN, f64::INFINITY] {
        let outcome = cart.add_to_cart(product("b", "Sock", price)).await.unwrap();
        assert!(matches!(
            outcome,
            MutationOutcome::Rejected {
                reason: InvalidProduct::NonFinitePrice,
                ..
            }
        ));
    }
    let before = scope.close().await.expect("store task");

    let raw = storage.peek(CART_STORAGE_KEY).unwrap();
    assert!(!raw.contains("null"));

    let scope = CartScope::spawn(Arc::new(storage), test_store_config());
    let after = scope.handle().products().await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.quantity_of("a"), Some(1));
    assert!(!after.contains("b"));
    scope.close().await;
}

#[tokio::test]
async fn snapshot_with_duplicate_ids_is_ignored() {
    let raw = r#"[
        {"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":1},
        {"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":2}
    ]"#;
    let storage = MemoryStore::with_value(CART_STORAGE_KEY, raw);
    let scope = CartScope::spawn(Arc::new(storage), test_store_config());
    assert!(scope.handle().products().await.unwrap().is_empty());
    scope.close().await;
}

#[tokio::test]
async fn custom_storage_key_is_used() {
    let storage = MemoryStore::new();
    let mut config = test_store_config();
    config.storage_key = "@Tests:cart".to_string();
    let scope = CartScope::spawn(Arc::new(storage.clone()), config);

    scope.handle().add_to_cart(shoe()).await.unwrap();
    assert!(storage.get("@Tests:cart").await.unwrap().is_some());
    assert!(storage.peek(CART_STORAGE_KEY).is_none());
    scope.close().await;
}

#[tokio::test]
async fn close_drains_and_rejects_late_callers() {
    let (storage, scope) = memory_scope();
    let cart = scope.handle();
    cart.add_to_cart(shoe()).await.unwrap();

    let final_cart = scope.close().await.expect("store task");
    assert_eq!(final_cart.quantity_of("a"), Some(1));
    assert_eq!(cart.phase(), StorePhase::Closed);
    assert_eq!(cart.increment("a").await, Err(StoreError::OutsideScope));

    let persisted = snapshot::decode(&storage.peek(CART_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(persisted, final_cart);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_callers_on_many_threads_lose_nothing() {
    let (storage, scope) = memory_scope();

    let mut tasks = Vec::new();
    for worker in 0..8 {
        let cart = scope.handle();
        tasks.push(tokio::spawn(async move {
            let id = format!("p{}", worker % 4);
            for _ in 0..25 {
                cart.add_to_cart(product(&id, "Item", 1.0)).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let products = scope.handle().products().await.unwrap();
    assert_eq!(products.len(), 4);
    assert_eq!(products.total_quantity(), 200);
    for item in products.items() {
        assert_eq!(item.quantity, 50);
    }

    let persisted = snapshot::decode(&storage.peek(CART_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(persisted, products);
    scope.close().await;
}
