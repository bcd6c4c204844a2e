//! Inbound creation request and the success payload returned for it.

use common::OrderId;
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// Request to create an order, as received from the ingress.
///
/// Missing fields deserialize to empty values so that they surface as
/// validation failures from the pipeline rather than as decode errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    /// Caller-supplied business key.
    pub order_id: String,

    /// The customer placing the order.
    pub customer_id: String,

    /// Where the customer is notified once the order is processed.
    #[serde(alias = "customer_phone_number")]
    pub customer_contact: String,

    /// Line items, in display order.
    pub items: Vec<String>,
}

impl CreateOrderRequest {
    /// Creates a new request.
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        customer_contact: impl Into<String>,
        items: Vec<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            customer_contact: customer_contact.into(),
            items,
        }
    }

    /// Convenience for building a request from string slices.
    pub fn with_items<I, S>(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        customer_contact: impl Into<String>,
        items: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            order_id,
            customer_id,
            customer_contact,
            items.into_iter().map(Into::into).collect(),
        )
    }
}

/// Success payload completed on the caller's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

impl OrderReceipt {
    pub fn new(order_id: OrderId, status: OrderStatus) -> Self {
        Self { order_id, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: CreateOrderRequest = serde_json::from_str(r#"{"order_id":"ABC-1"}"#).unwrap();
        assert_eq!(req.order_id, "ABC-1");
        assert!(req.customer_id.is_empty());
        assert!(req.customer_contact.is_empty());
        assert!(req.items.is_empty());
    }

    #[test]
    fn test_phone_number_alias() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"order_id":"ABC-1","customer_id":"C-1","customer_phone_number":"+15550001"}"#,
        )
        .unwrap();
        assert_eq!(req.customer_contact, "+15550001");
    }

    #[test]
    fn test_receipt_wire_shape() {
        let receipt = OrderReceipt::new(OrderId::from("ABC-1"), OrderStatus::Processed);
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "order_id": "ABC-1", "status": "PROCESSED" })
        );
    }
}
