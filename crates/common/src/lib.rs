//! Shared types for the order intake pipeline.

mod types;

pub use types::OrderId;
