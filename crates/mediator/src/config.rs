//! Mediator tuning knobs.

use std::time::Duration;

/// Timeouts applied by the mediator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediatorConfig {
    /// Upper bound on a single save before the caller gets a timeout error.
    pub persist_timeout: Duration,

    /// Upper bound on a single notification send.
    pub notify_timeout: Duration,
}

impl MediatorConfig {
    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            persist_timeout: Duration::from_secs(5),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = MediatorConfig::default();
        assert_eq!(config.persist_timeout, Duration::from_secs(5));
        assert_eq!(config.notify_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builders_override_one_field() {
        let config = MediatorConfig::default().with_persist_timeout(Duration::from_millis(50));
        assert_eq!(config.persist_timeout, Duration::from_millis(50));
        assert_eq!(config.notify_timeout, Duration::from_secs(10));
    }
}
