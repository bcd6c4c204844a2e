use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{ContactAddress, CustomerId, Order, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{OrderId, OrderRepository, Result, StorageError};

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` with a small pool.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let order_id = OrderId::new(row.try_get::<String, _>("order_id")?);
        let status: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status).ok_or_else(|| StorageError::Corrupt {
            order_id: order_id.clone(),
            reason: format!("unknown status '{status}'"),
        })?;

        Ok(Order::restore(
            order_id,
            CustomerId::new(row.try_get::<String, _>("customer_id")?),
            ContactAddress::new(row.try_get::<String, _>("customer_contact")?),
            status,
            row.try_get("items")?,
            row.try_get("created_at")?,
        ))
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: Order) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (order_id, customer_id, customer_contact, status, items, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (order_id) DO UPDATE SET
                customer_id = EXCLUDED.customer_id,
                customer_contact = EXCLUDED.customer_contact,
                status = EXCLUDED.status,
                items = EXCLUDED.items,
                created_at = EXCLUDED.created_at
            RETURNING order_id, customer_id, customer_contact, status, items, created_at
            "#,
        )
        .bind(order.order_id().as_str())
        .bind(order.customer_id().as_str())
        .bind(order.customer_contact().as_str())
        .bind(order.status().as_str())
        .bind(order.items().to_vec())
        .bind(order.created_at())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(order_id = %order.order_id(), "order row upserted");
        Self::row_to_order(row)
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT order_id, customer_id, customer_contact, status, items, created_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE created_at >= $1 AND created_at <= $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}
