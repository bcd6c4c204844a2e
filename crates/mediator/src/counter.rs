//! Process-wide count of successfully processed orders.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter of orders that made it through persistence.
///
/// Cheap to clone; all clones share one atomic. Every increment is mirrored
/// to the `orders_processed_total` metric.
#[derive(Debug, Clone, Default)]
pub struct ProcessedCounter {
    count: Arc<AtomicU64>,
}

impl ProcessedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one processed order and returns the new total.
    pub fn increment(&self) -> u64 {
        metrics::counter!("orders_processed_total").increment(1);
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the current total.
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
