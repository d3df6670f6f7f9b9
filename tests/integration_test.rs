use chrono::Duration;
use shop_orders::auth::StaticTokenVerifier;
use shop_orders::cache::{CacheStore, MemoryCache};
use shop_orders::config::ShopConfig;
use shop_orders::customer_actor::CustomerError;
use shop_orders::lifecycle::ShopSystem;
use shop_orders::model::{
    CustomerCreate, CustomerStatus, OrderId, OrderStatus, OrderView, ProductCreate, ProductId,
    ShippingInfo,
};
use shop_orders::workflow::{OrderConditions, OrderRequest, ShopError};
use std::sync::Arc;

const ALICE: &str = "t-alice";

fn customer(login_id: &str) -> CustomerCreate {
    CustomerCreate {
        login_id: login_id.to_string(),
        email: format!("{login_id}@example.com"),
        credential_digest: "sha256:x".to_string(),
        user_name: login_id.to_string(),
        phone_number: "010-1234-5678".to_string(),
    }
}

/// A running shop with customer `alice` (token `t-alice`) and one product:
/// stock 10, price 100.
async fn setup() -> (ShopSystem, Arc<StaticTokenVerifier>, ProductId) {
    let tokens = Arc::new(StaticTokenVerifier::new());
    tokens.grant(ALICE, "alice", Duration::minutes(10));
    let system = ShopSystem::new(ShopConfig::default(), tokens.clone());

    system
        .customers
        .signup(customer("alice"))
        .await
        .expect("Failed to sign up");
    let product_id = system
        .catalog
        .register(ProductCreate {
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            category: "tools".to_string(),
            price: 100,
            stock: 10,
            shipping: String::new(),
        })
        .await
        .expect("Failed to register product");
    (system, tokens, product_id)
}

async fn stock(system: &ShopSystem, id: ProductId) -> u32 {
    system.products.check_stock(id).await.expect("Failed to check stock")
}

#[tokio::test]
async fn test_order_lifecycle_moves_stock() {
    let (system, _tokens, pid) = setup().await;

    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 3), ALICE)
        .await
        .expect("Failed to place order");
    assert_eq!(placed.total_price, 300);
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.login_id, "alice");
    assert_eq!(stock(&system, pid).await, 7);

    let id = OrderId(placed.id);
    let amended = system
        .workflow
        .update_order(id, 5, ALICE)
        .await
        .expect("Failed to amend order");
    assert_eq!(amended.quantity, 5);
    assert_eq!(amended.total_price, 500);
    assert_eq!(stock(&system, pid).await, 5);

    let smaller = system.workflow.update_order(id, 2, ALICE).await.unwrap();
    assert_eq!(smaller.quantity, 2);
    assert_eq!(stock(&system, pid).await, 8);

    let cancelled = system.workflow.cancel_order(id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock(&system, pid).await, 10);

    // A second cancel is a no-op and must not restore stock again.
    let again = system.workflow.cancel_order(id).await.unwrap();
    assert_eq!(again.status, OrderStatus::Cancelled);
    assert_eq!(stock(&system, pid).await, 10);

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_update_with_same_quantity_changes_nothing() {
    let (system, _tokens, pid) = setup().await;
    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 4), ALICE)
        .await
        .unwrap();

    let same = system
        .workflow
        .update_order(OrderId(placed.id), 4, ALICE)
        .await
        .unwrap();
    assert_eq!(same.quantity, 4);
    assert_eq!(same.total_price, placed.total_price);
    assert_eq!(stock(&system, pid).await, 6);
}

#[tokio::test]
async fn test_update_beyond_stock_keeps_order() {
    let (system, _tokens, pid) = setup().await;
    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 4), ALICE)
        .await
        .unwrap();

    let err = system
        .workflow
        .update_order(OrderId(placed.id), 20, ALICE)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ShopError::InsufficientStock {
            requested: 16,
            available: 6
        }
    );

    let order = system.orders.load(OrderId(placed.id)).await.unwrap();
    assert_eq!(order.quantity, 4);
    assert_eq!(order.total_price, 400);
    assert_eq!(stock(&system, pid).await, 6);
}

#[tokio::test]
async fn test_concurrent_orders_for_last_unit() {
    let (system, _tokens, _) = setup().await;
    let last = system
        .catalog
        .register(ProductCreate {
            name: "Rare".to_string(),
            description: String::new(),
            category: "tools".to_string(),
            price: 999,
            stock: 1,
            shipping: String::new(),
        })
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        system
            .workflow
            .create_order(OrderRequest::new(last.0, 1), ALICE),
        system
            .workflow
            .create_order(OrderRequest::new(last.0, 1), ALICE),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(ShopError::InsufficientStock { .. }))));
    assert_eq!(stock(&system, last).await, 0);
}

#[tokio::test]
async fn test_rejected_requests_leave_stock_alone() {
    let (system, _tokens, pid) = setup().await;

    assert!(matches!(
        system
            .workflow
            .create_order(OrderRequest::new(pid.0, 0), ALICE)
            .await,
        Err(ShopError::BadRequest(_))
    ));
    assert_eq!(
        system
            .workflow
            .create_order(OrderRequest::new(pid.0, 1), "forged")
            .await,
        Err(ShopError::UnsupportedToken)
    );
    assert!(matches!(
        system
            .workflow
            .create_order(OrderRequest::new(pid.0, 11), ALICE)
            .await,
        Err(ShopError::InsufficientStock {
            requested: 11,
            available: 10
        })
    ));
    assert!(matches!(
        system
            .workflow
            .create_order(OrderRequest::new(404, 1), ALICE)
            .await,
        Err(ShopError::NotFound(_))
    ));
    assert_eq!(stock(&system, pid).await, 10);
}

#[tokio::test]
async fn test_unknown_customer_rolls_back_stock() {
    let (system, tokens, pid) = setup().await;
    tokens.grant("t-ghost", "ghost", Duration::minutes(10));

    let err = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 3), "t-ghost")
        .await
        .unwrap_err();
    assert_eq!(err, ShopError::CustomerNotFound("ghost".to_string()));
    assert_eq!(err.http_status(), 400);
    assert_eq!(stock(&system, pid).await, 10);
    assert_eq!(
        system.workflow.get_orders().await,
        Err(ShopError::NotFound("orders".to_string()))
    );
}

#[tokio::test]
async fn test_suspended_customer_cannot_order() {
    let (system, _tokens, pid) = setup().await;
    let alice = system
        .customers
        .find_active("alice")
        .await
        .expect("alice is active");
    system
        .customers
        .change_status(alice.id, CustomerStatus::Suspended)
        .await
        .unwrap();

    assert!(matches!(
        system
            .workflow
            .create_order(OrderRequest::new(pid.0, 1), ALICE)
            .await,
        Err(ShopError::CustomerNotFound(_))
    ));
    assert_eq!(stock(&system, pid).await, 10);
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    let (system, _tokens, pid) = setup().await;

    let err = system
        .workflow
        .create_orders(
            vec![OrderRequest::new(pid.0, 3), OrderRequest::new(pid.0, 50)],
            ALICE,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::InsufficientStock { .. }));
    assert_eq!(stock(&system, pid).await, 10);
    assert!(system.workflow.get_orders().await.is_err());

    let placed = system
        .workflow
        .create_orders(
            vec![OrderRequest::new(pid.0, 3), OrderRequest::new(pid.0, 2)],
            ALICE,
        )
        .await
        .unwrap();
    assert_eq!(placed.len(), 2);
    assert_eq!(stock(&system, pid).await, 5);

    assert!(matches!(
        system.workflow.create_orders(Vec::new(), ALICE).await,
        Err(ShopError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_single_order_reads_are_cache_aside() {
    let (system, _tokens, pid) = setup().await;
    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 1), ALICE)
        .await
        .unwrap();
    let id = OrderId(placed.id);
    let key = format!("order:{}", placed.id);

    // A cached entry is served as is, without asking the order actor.
    let mut cached = placed.clone();
    cached.quantity = 42;
    system
        .store
        .set(&key, serde_json::to_string(&cached).unwrap(), None)
        .await
        .unwrap();
    assert_eq!(system.workflow.get_order(id).await.unwrap().quantity, 42);

    // A corrupt entry falls through to the actor and is written back.
    system
        .store
        .set(&key, "{not json".to_string(), None)
        .await
        .unwrap();
    assert_eq!(system.workflow.get_order(id).await.unwrap(), placed);
    let healed: OrderView =
        serde_json::from_str(&system.store.get(&key).await.unwrap().unwrap()).unwrap();
    assert_eq!(healed, placed);

    // Cancelling evicts, and the next read repopulates from the actor.
    system.workflow.cancel_order(id).await.unwrap();
    assert!(system.store.get(&key).await.unwrap().is_none());

    let fresh = system.workflow.get_order(id).await.unwrap();
    assert_eq!(fresh.status, OrderStatus::Cancelled);
    assert!(system.store.get(&key).await.unwrap().is_some());
}

async fn after_yields(n: usize) {
    for _ in 0..n {
        tokio::task::yield_now().await;
    }
}

/// Runs `update_order(a, quantity)` against `cancel_order(a)` with the given head starts,
/// where order `a` holds 3 and another order holds 6 of the 10 units.
async fn race_update_and_cancel(quantity: u32, update_delay: usize, cancel_delay: usize) {
    let (system, _tokens, pid) = setup().await;
    let a = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 3), ALICE)
        .await
        .unwrap();
    system
        .workflow
        .create_order(OrderRequest::new(pid.0, 6), ALICE)
        .await
        .unwrap();
    let a = OrderId(a.id);

    let (updated, cancelled) = tokio::join!(
        async {
            after_yields(update_delay).await;
            system.workflow.update_order(a, quantity, ALICE).await
        },
        async {
            after_yields(cancel_delay).await;
            system.workflow.cancel_order(a).await
        },
    );

    assert!(cancelled.is_ok(), "cancel failed: {cancelled:?}");
    if let Err(e) = &updated {
        assert!(
            matches!(
                e,
                ShopError::InvalidStatus(_) | ShopError::InsufficientStock { .. }
            ),
            "unexpected update error: {e:?}"
        );
    }
    let order = system.orders.load(a).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    // Only the other order still holds stock.
    assert_eq!(
        stock(&system, pid).await,
        4,
        "quantity {quantity}, delays {update_delay}/{cancel_delay}"
    );
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_update_racing_cancel_keeps_stock_consistent() {
    // 4 takes the last free unit, 5 asks for more than is left, 2 gives one back.
    for quantity in [4, 5, 2] {
        for delay in 0..8 {
            race_update_and_cancel(quantity, 0, delay).await;
            race_update_and_cancel(quantity, delay, 0).await;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_update_racing_cancel_on_worker_threads() {
    for quantity in [4, 5, 2] {
        for delay in 0..4 {
            race_update_and_cancel(quantity, 0, delay).await;
            race_update_and_cancel(quantity, delay, 0).await;
        }
    }
}

#[tokio::test]
async fn test_concurrent_cancels_restock_once() {
    for delay in 0..6 {
        let (system, _tokens, pid) = setup().await;
        let placed = system
            .workflow
            .create_order(OrderRequest::new(pid.0, 3), ALICE)
            .await
            .unwrap();
        let id = OrderId(placed.id);

        let (first, second) = tokio::join!(system.workflow.cancel_order(id), async {
            after_yields(delay).await;
            system.workflow.cancel_order(id).await
        });

        assert_eq!(first.unwrap().status, OrderStatus::Cancelled);
        assert_eq!(second.unwrap().status, OrderStatus::Cancelled);
        assert_eq!(stock(&system, pid).await, 10);
        system.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_status_transitions() {
    let (system, _tokens, pid) = setup().await;
    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 2), ALICE)
        .await
        .unwrap();
    let id = OrderId(placed.id);

    assert_eq!(
        system.workflow.ship_order(id).await.unwrap().status,
        OrderStatus::Shipping
    );
    assert!(matches!(
        system.workflow.update_order(id, 3, ALICE).await,
        Err(ShopError::InvalidStatus(_))
    ));
    assert_eq!(
        system.workflow.complete_order(id).await.unwrap().status,
        OrderStatus::Completed
    );

    let err = system.workflow.cancel_order(id).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_ORDER_STATUS");
    assert_eq!(stock(&system, pid).await, 8);
}

#[tokio::test]
async fn test_update_shipping_only_while_pending() {
    let (system, _tokens, pid) = setup().await;
    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 1), ALICE)
        .await
        .unwrap();
    let id = OrderId(placed.id);
    let info = ShippingInfo {
        recipient: "Alice".to_string(),
        zip_code: "04524".to_string(),
        address: "1 Main St".to_string(),
        phone: "010-1234-5678".to_string(),
        payment_method: "CARD".to_string(),
        remarks: String::new(),
    };

    let view = system
        .workflow
        .update_shipping(id, info.clone(), ALICE)
        .await
        .unwrap();
    assert_eq!(view.shipping, Some(info.clone()));

    system.workflow.ship_order(id).await.unwrap();
    assert!(system
        .workflow
        .update_shipping(id, info, ALICE)
        .await
        .is_err());
}

#[tokio::test]
async fn test_orders_with_conditions() {
    let (system, tokens, pid) = setup().await;
    system.customers.signup(customer("bob")).await.unwrap();
    tokens.grant("t-bob", "bob", Duration::minutes(10));

    let first = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 1), ALICE)
        .await
        .unwrap();
    system
        .workflow
        .create_order(OrderRequest::new(pid.0, 1), ALICE)
        .await
        .unwrap();
    system
        .workflow
        .create_order(OrderRequest::new(pid.0, 1), "t-bob")
        .await
        .unwrap();
    system
        .workflow
        .cancel_order(OrderId(first.id))
        .await
        .unwrap();

    let all_alice = system
        .workflow
        .get_orders_with_conditions(OrderConditions::for_customer("alice"))
        .await
        .unwrap();
    assert_eq!(all_alice.len(), 2);

    let today = chrono::Utc::now().date_naive();
    let mut pending = OrderConditions::for_customer("alice");
    pending.status = Some(OrderStatus::Pending);
    pending.start_date = Some(today);
    pending.end_date = Some(today);
    let pending = system
        .workflow
        .get_orders_with_conditions(pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, OrderStatus::Pending);

    assert!(matches!(
        system
            .workflow
            .get_orders_with_conditions(OrderConditions::for_customer("carol"))
            .await,
        Err(ShopError::NotFound(_))
    ));
    assert_eq!(system.workflow.get_orders().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_signup_rejects_duplicates() {
    let (system, _tokens, _) = setup().await;

    assert!(matches!(
        system.customers.signup(customer("alice")).await,
        Err(CustomerError::AlreadyExists(_))
    ));

    let mut same_email = customer("alice2");
    same_email.email = "ALICE@example.com".to_string();
    let err = system.customers.signup(same_email).await.unwrap_err();
    assert_eq!(ShopError::from(err).code(), "ALREADY_EXIST_DATA");
}

#[tokio::test]
async fn test_cart_and_catalog_over_shared_store() {
    let (system, _tokens, pid) = setup().await;

    system.cart.add("alice", pid.0, 2).await.unwrap();
    system.cart.add("alice", pid.0, 1).await.unwrap();
    let lines = system.cart.items("alice").await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(lines[0].subtotal(), 300);

    system.catalog.detail(pid).await.unwrap();
    assert_eq!(system.catalog.view_count(pid).await.unwrap(), 1);
    assert_eq!(
        system.store.get(&format!("product:view:{}", pid.0)).await.unwrap(),
        Some("1".to_string())
    );

    system.cart.clear("alice").await.unwrap();
    assert!(system.cart.items("alice").await.is_err());
}

#[tokio::test]
async fn test_login_issues_a_working_token() {
    let (system, _tokens, pid) = setup().await;

    let login = system
        .accounts
        .login("alice", "sha256:x")
        .await
        .expect("Failed to log in");
    assert_eq!(login.customer.login_id, "alice");
    assert!(login.customer.last_login_at.is_some());
    assert_ne!(login.token, ALICE);

    let placed = system
        .workflow
        .create_order(OrderRequest::new(pid.0, 2), &login.token)
        .await
        .expect("Failed to order with issued token");
    assert_eq!(placed.login_id, "alice");

    assert!(system.accounts.logout(&login.token));
    assert!(matches!(
        system
            .workflow
            .create_order(OrderRequest::new(pid.0, 1), &login.token)
            .await,
        Err(ShopError::UnsupportedToken)
    ));
    assert_eq!(stock(&system, pid).await, 8);
}

#[tokio::test]
async fn test_login_refuses_unknown_inactive_and_wrong_credentials() {
    let (system, _tokens, _) = setup().await;
    system.accounts.signup(customer("carol")).await.unwrap();
    let carol = system.customers.find_active("carol").await.unwrap();
    system
        .customers
        .change_status(carol.id, CustomerStatus::Inactive)
        .await
        .unwrap();

    for (login_id, digest) in [
        ("nobody", "sha256:x"),
        ("carol", "sha256:x"),
        ("alice", "sha256:wrong"),
    ] {
        let err = system.accounts.login(login_id, digest).await.unwrap_err();
        assert_eq!(err, ShopError::CustomerNotFound(login_id.to_string()));
        assert_eq!(err.code(), "NOT_EXIST_CUSTOMER_ACCOUNT");
    }

    let alice = system.customers.find_active("alice").await.unwrap();
    assert!(alice.last_login_at.is_none());
}

#[tokio::test]
async fn test_background_sweep_drops_expired_cache_entries() {
    let config = ShopConfig {
        cache_sweep_secs: 1,
        ..ShopConfig::default()
    };
    let cache = Arc::new(MemoryCache::new());
    let system = ShopSystem::with_cache(
        config,
        Arc::new(StaticTokenVerifier::new()),
        cache.clone(),
    );

    system
        .store
        .set("stale", "x".to_string(), Some(std::time::Duration::from_millis(1)))
        .await
        .unwrap();
    system.store.set("kept", "y".to_string(), None).await.unwrap();
    assert_eq!(cache.len(), 2);

    // Nothing reads "stale" again; only the sweep can drop it.
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    assert_eq!(cache.len(), 1);
    assert_eq!(system.store.get("kept").await.unwrap().as_deref(), Some("y"));

    system.shutdown().await.expect("Shutdown failed");
}
