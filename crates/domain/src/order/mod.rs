//! Order record and related types.

mod record;
mod request;
mod status;
mod value_objects;

pub use record::Order;
pub use request::{CreateOrderRequest, OrderReceipt};
pub use status::OrderStatus;
pub use value_objects::{ContactAddress, CustomerId};

use thiserror::Error;

/// Errors raised while building an order from a creation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A required field was empty or whitespace only.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// A line item was empty or whitespace only.
    #[error("Item at position {index} is blank")]
    BlankItem { index: usize },
}

impl OrderError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            OrderError::MissingField { field } => field,
            OrderError::BlankItem { .. } => "items",
        }
    }
}
