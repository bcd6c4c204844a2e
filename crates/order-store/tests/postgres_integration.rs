//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use domain::{CreateOrderRequest, Order, OrderStatus};
use order_store::{OrderId, OrderRepository, PostgresOrderRepository};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/001_create_orders_table.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and an empty orders table
async fn get_test_store() -> PostgresOrderRepository {
    let info = get_container_info().await;

    let store = PostgresOrderRepository::connect(&info.connection_string, 5)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders")
        .execute(store.pool())
        .await
        .unwrap();

    store
}

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn order_at(order_id: &str, created_at: DateTime<Utc>) -> Order {
    Order::new(
        CreateOrderRequest::with_items(order_id, "C-1", "+15550001", ["sku1", "sku2"]),
        OrderStatus::Processed,
        created_at,
    )
    .unwrap()
}

#[tokio::test]
#[serial]
async fn save_returns_durable_record() {
    let store = get_test_store().await;
    let order = order_at("ABC-1", Utc::now());

    let saved = store.save(order.clone()).await.unwrap();
    assert_eq!(saved, order);
}

#[tokio::test]
#[serial]
async fn find_by_id_preserves_item_order() {
    let store = get_test_store().await;
    let order = Order::new(
        CreateOrderRequest::with_items("ABC-2", "C-1", "+15550001", ["z", "a", "m"]),
        OrderStatus::Processed,
        Utc::now(),
    )
    .unwrap();
    store.save(order.clone()).await.unwrap();

    let found = store
        .find_by_id(&OrderId::from("ABC-2"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.items(), order.items());
    assert_eq!(found.created_at(), order.created_at());
    assert_eq!(found.status(), OrderStatus::Processed);
}

#[tokio::test]
#[serial]
async fn find_missing_returns_none() {
    let store = get_test_store().await;
    let found = store.find_by_id(&OrderId::from("missing")).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
#[serial]
async fn save_same_id_overwrites() {
    let store = get_test_store().await;
    store.save(order_at("ABC-3", ts(1_000))).await.unwrap();
    store.save(order_at("ABC-3", ts(2_000))).await.unwrap();

    let found = store
        .find_by_id(&OrderId::from("ABC-3"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.created_at(), ts(2_000));
    assert_eq!(store.count_between(ts(0), ts(10_000)).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn count_between_is_inclusive() {
    let store = get_test_store().await;
    store.save(order_at("A", ts(1_000))).await.unwrap();
    store.save(order_at("B", ts(2_000))).await.unwrap();
    store.save(order_at("C", ts(3_000))).await.unwrap();

    assert_eq!(store.count_between(ts(1_000), ts(3_000)).await.unwrap(), 3);
    assert_eq!(store.count_between(ts(1_001), ts(3_000)).await.unwrap(), 2);
    assert_eq!(store.count_between(ts(3_000), ts(1_000)).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn corrupt_status_is_reported() {
    let store = get_test_store().await;
    sqlx::query(
        "INSERT INTO orders (order_id, customer_id, customer_contact, status, items, created_at)
         VALUES ('BAD-1', 'C-1', '+15550001', 'SHIPPED', '{}', now())",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let result = store.find_by_id(&OrderId::from("BAD-1")).await;
    assert!(matches!(
        result,
        Err(order_store::StorageError::Corrupt { .. })
    ));
}
