//! The order record persisted by the pipeline.

use chrono::{DateTime, SubsecRound, Utc};
use common::OrderId;
use serde::Serialize;

use super::{ContactAddress, CreateOrderRequest, CustomerId, OrderError, OrderReceipt, OrderStatus};

/// Immutable order record.
///
/// Built once per creation request and never mutated afterwards. A later
/// request carrying the same `order_id` produces a new record that supersedes
/// this one in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    order_id: OrderId,
    customer_id: CustomerId,
    customer_contact: ContactAddress,
    status: OrderStatus,
    items: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from a creation request.
    ///
    /// `created_at` is truncated to microseconds, the finest precision the
    /// stores keep, so a record reads back exactly as it was written.
    pub fn new(
        request: CreateOrderRequest,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let CreateOrderRequest {
            order_id,
            customer_id,
            customer_contact,
            items,
        } = request;

        require("order_id", &order_id)?;
        require("customer_id", &customer_id)?;
        require("customer_contact", &customer_contact)?;

        if let Some(index) = items.iter().position(|item| item.trim().is_empty()) {
            return Err(OrderError::BlankItem { index });
        }

        Ok(Self {
            order_id: OrderId::new(order_id),
            customer_id: CustomerId::new(customer_id),
            customer_contact: ContactAddress::new(customer_contact),
            status,
            items,
            created_at: created_at.trunc_subsecs(6),
        })
    }

    /// Rebuilds a record read back from a store, without validation.
    pub fn restore(
        order_id: OrderId,
        customer_id: CustomerId,
        customer_contact: ContactAddress,
        status: OrderStatus,
        items: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            customer_contact,
            status,
            items,
            created_at,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn customer_contact(&self) -> &ContactAddress {
        &self.customer_contact
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Line items in the order they were submitted.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the success payload describing this order.
    pub fn receipt(&self) -> OrderReceipt {
        OrderReceipt::new(self.order_id.clone(), self.status)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::MissingField { field });
    }
    Ok(())
}
