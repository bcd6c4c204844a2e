//! Timestamp source for order records.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// UTC clock that never runs backwards within one instance.
///
/// If the wall clock steps back, the last issued timestamp is repeated
/// instead. Separate instances are not coordinated.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current time, clamped to the last value issued.
    pub fn now(&self) -> DateTime<Utc> {
        self.issue(Utc::now())
    }

    fn issue(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let candidate = wall.timestamp_micros();
        let previous = self.last_micros.fetch_max(candidate, Ordering::AcqRel);
        let micros = previous.max(candidate);
        DateTime::from_timestamp_micros(micros).unwrap_or(wall)
    }
}
