//! Domain layer for the order intake pipeline.
//!
//! This crate provides:
//! - The immutable `Order` record built from a creation request
//! - `OrderStatus`, set by the pipeline rather than the caller
//! - Request validation with `OrderError`

pub mod order;

pub use common::OrderId;
pub use order::{
    ContactAddress, CreateOrderRequest, CustomerId, Order, OrderError, OrderReceipt, OrderStatus,
};
