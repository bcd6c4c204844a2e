//! Persistence gateway for order records.
//!
//! The pipeline only ever talks to the [`OrderRepository`] trait. Two
//! backends are provided: an in-memory store with failure and latency
//! injection for tests, and a PostgreSQL store built on sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use common::OrderId;
pub use error::{Result, StorageError};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use repository::OrderRepository;
