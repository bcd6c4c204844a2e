use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::Order;

use crate::{OrderId, Result};

/// Durable store for order records, keyed by order ID.
///
/// Implementations are shared across every in-flight request and must be
/// safe for concurrent use. Saves are not ordered with respect to each other
/// and may complete on any worker.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores an order, replacing any earlier record with the same ID.
    ///
    /// Returns the record as it was made durable.
    async fn save(&self, order: Order) -> Result<Order>;

    /// Looks up an order by its business key.
    ///
    /// Returns None if no record exists.
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// Counts orders created within `[start, end]`, both ends inclusive.
    ///
    /// Returns 0 when `start` is after `end`.
    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64>;
}
