//! End-to-end order lifecycle tests against a real SQLite database.

use std::sync::Arc;
use std::time::Duration;

use bakery_server::auth::CurrentUser;
use bakery_server::db::DbService;
use bakery_server::db::repository::product;
use bakery_server::orders::{DraftError, OrderService, SqliteCatalog, SqliteOrderStore};
use bakery_server::utils::AppError;
use shared::models::{
    OrderCreate, OrderLineRequest, OrderStatus, ProductCreate, Role,
};
use sqlx::SqlitePool;

struct TestEnv {
    // Keeps the database file alive for the test's duration
    _dir: tempfile::TempDir,
    pool: SqlitePool,
    service: Arc<OrderService>,
}

async fn test_env() -> TestEnv {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("bakery.db");
    let db = DbService::new(&db_path.to_string_lossy())
        .await
        .expect("init database");
    let pool = db.pool;
    let service = Arc::new(OrderService::new(
        Arc::new(SqliteOrderStore::new(pool.clone())),
        Arc::new(SqliteCatalog::new(pool.clone())),
        Duration::from_secs(5),
    ));
    TestEnv {
        _dir: dir,
        pool,
        service,
    }
}

async fn seed_product(pool: &SqlitePool, name: &str, price: f64, stock: i64) -> i64 {
    product::create(
        pool,
        ProductCreate {
            name: name.to_string(),
            description: None,
            price,
            stock,
            image_url: None,
        },
    )
    .await
    .expect("seed product")
    .id
}

fn actor(id: i64, role: Role) -> CurrentUser {
    CurrentUser {
        id,
        name: format!("user-{id}"),
        email: format!("user{id}@example.com"),
        role,
    }
}

fn order_of(product_id: i64, quantity: i64) -> OrderCreate {
    OrderCreate {
        items: vec![OrderLineRequest {
            product_id,
            quantity,
        }],
        customer_name: None,
        customer_email: None,
        phone: None,
        address: None,
        client_token: None,
    }
}

#[tokio::test]
async fn customer_order_totals_and_reserves_stock() {
    let env = test_env().await;
    let croissant = seed_product(&env.pool, "Croissant", 22.00, 10).await;
    let customer = actor(1, Role::Customer);

    let order = env
        .service
        .place_order(&customer, order_of(croissant, 2))
        .await
        .unwrap();

    assert_eq!(order.total, 44.00);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, Some(1));
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].unit_price, 22.00);
    assert_eq!(order.lines[0].subtotal, 44.00);

    // Stock was reserved inside the create transaction
    let stocked = product::find_by_id(&env.pool, croissant)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stocked.stock, 8);
}

#[tokio::test]
async fn listings_are_newest_first_and_customer_scoped() {
    let env = test_env().await;
    let loaf = seed_product(&env.pool, "Sourdough Loaf", 8.50, 100).await;
    let alice = actor(1, Role::Customer);
    let bob = actor(2, Role::Customer);

    let mut placed = Vec::new();
    for who in [&alice, &bob, &alice] {
        placed.push(
            env.service
                .place_order(who, order_of(loaf, 1))
                .await
                .unwrap()
                .id,
        );
        // Separate creation timestamps so ordering is deterministic
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let staff_view = env.service.list_orders(&actor(9, Role::Baker)).await.unwrap();
    let listed: Vec<i64> = staff_view.iter().map(|o| o.id).collect();
    let mut expected = placed.clone();
    expected.reverse();
    assert_eq!(listed, expected, "staff see every order, newest first");

    let alice_view = env.service.list_orders(&alice).await.unwrap();
    assert_eq!(alice_view.len(), 2);
    assert!(alice_view.iter().all(|o| o.customer_id == Some(1)));
    assert!(alice_view[0].created_at >= alice_view[1].created_at);
}

#[tokio::test]
async fn completed_orders_reject_further_transitions() {
    let env = test_env().await;
    let tart = seed_product(&env.pool, "Lemon Tart", 6.25, 5).await;
    let order = env
        .service
        .place_order(&actor(1, Role::Customer), order_of(tart, 1))
        .await
        .unwrap();
    let staff = actor(5, Role::Manager);

    let completed = env
        .service
        .change_status(&staff, order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.completed_time.is_some());
    // The line list never changes after creation
    assert_eq!(completed.lines, order.lines);

    let err = env
        .service
        .change_status(&staff, order.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Processing,
        }
    ));
}

#[tokio::test]
async fn start_time_is_stamped_once_and_survives_completion() {
    let env = test_env().await;
    let bun = seed_product(&env.pool, "Cinnamon Bun", 4.00, 5).await;
    let order = env
        .service
        .place_order(&actor(1, Role::Customer), order_of(bun, 1))
        .await
        .unwrap();
    let staff = actor(5, Role::Baker);

    let processing = env
        .service
        .change_status(&staff, order.id, OrderStatus::Processing)
        .await
        .unwrap();
    let started = processing.start_time.expect("start_time stamped");

    let completed = env
        .service
        .change_status(&staff, order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.start_time, Some(started));
    assert!(completed.completed_time.unwrap() >= started);
}

#[tokio::test]
async fn concurrent_complete_and_cancel_resolve_deterministically() {
    let env = test_env().await;
    let cake = seed_product(&env.pool, "Carrot Cake", 18.00, 10).await;
    let order = env
        .service
        .place_order(&actor(1, Role::Customer), order_of(cake, 1))
        .await
        .unwrap();

    let svc_a = env.service.clone();
    let svc_b = env.service.clone();
    let id = order.id;
    let complete = tokio::spawn(async move {
        svc_a
            .change_status(&actor(5, Role::Manager), id, OrderStatus::Completed)
            .await
    });
    let cancel = tokio::spawn(async move {
        svc_b
            .change_status(&actor(6, Role::Cashier), id, OrderStatus::Cancelled)
            .await
    });

    let results = [complete.await.unwrap(), cancel.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one transition commits");
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser.as_ref().unwrap_err(),
        AppError::InvalidTransition { .. }
    ));

    // Stock reflects the winner: restored on cancel, kept on complete
    let final_order = results.iter().find(|r| r.is_ok()).unwrap().as_ref().unwrap();
    let stock = product::find_by_id(&env.pool, cake)
        .await
        .unwrap()
        .unwrap()
        .stock;
    match final_order.status {
        OrderStatus::Cancelled => assert_eq!(stock, 10),
        OrderStatus::Completed => assert_eq!(stock, 9),
        other => panic!("unexpected final status {other}"),
    }
}

#[tokio::test]
async fn concurrent_orders_cannot_oversell() {
    let env = test_env().await;
    let eclair = seed_product(&env.pool, "Eclair", 3.75, 3).await;

    let svc_a = env.service.clone();
    let svc_b = env.service.clone();
    let first = tokio::spawn(async move {
        svc_a
            .place_order(&actor(1, Role::Customer), order_of(eclair, 2))
            .await
    });
    let second = tokio::spawn(async move {
        svc_b
            .place_order(&actor(2, Role::Customer), order_of(eclair, 2))
            .await
    });

    let results = [first.await.unwrap(), second.await.unwrap()];
    let placed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 1, "only one order fits the remaining stock");
    let rejected = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        rejected.as_ref().unwrap_err(),
        AppError::Validation(DraftError::InsufficientStock { .. })
    ));

    let stock = product::find_by_id(&env.pool, eclair)
        .await
        .unwrap()
        .unwrap()
        .stock;
    assert_eq!(stock, 1);
}

#[tokio::test]
async fn cancellation_restores_reserved_stock() {
    let env = test_env().await;
    let baguette = seed_product(&env.pool, "Baguette", 2.50, 10).await;
    let order = env
        .service
        .place_order(&actor(1, Role::Customer), order_of(baguette, 4))
        .await
        .unwrap();

    let after_create = product::find_by_id(&env.pool, baguette)
        .await
        .unwrap()
        .unwrap()
        .stock;
    assert_eq!(after_create, 6);

    env.service
        .change_status(&actor(5, Role::Manager), order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let after_cancel = product::find_by_id(&env.pool, baguette)
        .await
        .unwrap()
        .unwrap()
        .stock;
    assert_eq!(after_cancel, 10);
}

#[tokio::test]
async fn create_is_idempotent_under_a_client_token() {
    let env = test_env().await;
    let scone = seed_product(&env.pool, "Scone", 3.00, 10).await;
    let customer = actor(1, Role::Customer);

    let mut request = order_of(scone, 2);
    request.client_token = Some("retry-abc123".to_string());

    let first = env
        .service
        .place_order(&customer, request.clone())
        .await
        .unwrap();
    let replay = env.service.place_order(&customer, request).await.unwrap();

    assert_eq!(first.id, replay.id);

    // The replay reserved nothing further
    let stock = product::find_by_id(&env.pool, scone)
        .await
        .unwrap()
        .unwrap()
        .stock;
    assert_eq!(stock, 8);
}

#[tokio::test]
async fn staff_walk_in_orders_have_no_customer_reference() {
    let env = test_env().await;
    let muffin = seed_product(&env.pool, "Muffin", 3.25, 10).await;
    let cashier = actor(7, Role::Cashier);

    let mut request = order_of(muffin, 1);
    request.customer_name = Some("Counter Guest".to_string());
    let order = env.service.place_order(&cashier, request).await.unwrap();

    assert_eq!(order.customer_id, None);
    assert_eq!(order.customer_name, "Counter Guest");

    // A walk-in order never shows up in anyone's personal history
    assert!(env
        .service
        .list_own_orders(&cashier)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unknown_order_id_is_not_found() {
    let env = test_env().await;
    let err = env
        .service
        .change_status(&actor(5, Role::Admin), 987654321, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn catalog_price_changes_never_touch_past_orders() {
    let env = test_env().await;
    let pie = seed_product(&env.pool, "Apple Pie", 12.00, 10).await;
    let order = env
        .service
        .place_order(&actor(1, Role::Customer), order_of(pie, 1))
        .await
        .unwrap();

    product::update(
        &env.pool,
        pie,
        shared::models::ProductUpdate {
            name: None,
            description: None,
            price: Some(15.00),
            stock: None,
            image_url: None,
        },
    )
    .await
    .unwrap();

    let reread = env
        .service
        .list_orders(&actor(5, Role::Manager))
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.id == order.id)
        .unwrap();
    assert_eq!(reread.lines[0].unit_price, 12.00);
    assert_eq!(reread.total, 12.00);
}
