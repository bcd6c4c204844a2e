use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::Order;
use tokio::sync::RwLock;

use crate::{OrderId, OrderRepository, Result, StorageError};

#[derive(Debug, Default)]
struct InMemoryState {
    orders: HashMap<OrderId, Order>,
    save_attempts: usize,
    fail_on_save: bool,
    save_delay: Option<Duration>,
    delays_by_order: HashMap<OrderId, Duration>,
}

/// In-memory order store for testing and local runs.
///
/// Provides the same interface as the PostgreSQL implementation, plus knobs
/// to inject save failures and latency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent save fail with `StorageError::Unavailable`.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Delays every save by the given duration.
    pub async fn set_save_delay(&self, delay: Option<Duration>) {
        self.state.write().await.save_delay = delay;
    }

    /// Delays saves of one particular order, overriding the global delay.
    pub async fn set_save_delay_for(&self, order_id: impl Into<OrderId>, delay: Duration) {
        self.state
            .write()
            .await
            .delays_by_order
            .insert(order_id.into(), delay);
    }

    /// Returns how many times `save` has been called, successful or not.
    pub async fn save_attempts(&self) -> usize {
        self.state.read().await.save_attempts
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Removes all orders and resets the counters and knobs.
    pub async fn clear(&self) {
        *self.state.write().await = InMemoryState::default();
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> Result<Order> {
        // Never hold the lock across the injected delay
        let (fail, delay) = {
            let mut state = self.state.write().await;
            state.save_attempts += 1;
            let delay = state
                .delays_by_order
                .get(order.order_id())
                .copied()
                .or(state.save_delay);
            (state.fail_on_save, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(StorageError::Unavailable(
                "in-memory store configured to fail".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        state.orders.insert(order.order_id().clone(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.get(order_id).cloned())
    }

    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        let state = self.state.read().await;
        let count = state
            .orders
            .values()
            .filter(|o| o.created_at() >= start && o.created_at() <= end)
            .count();
        Ok(count as u64)
    }
}
