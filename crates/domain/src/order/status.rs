//! Order status.

use serde::{Deserialize, Serialize};

/// Status recorded on an order.
///
/// The status is assigned by the pipeline, never by the caller. Orders that
/// make it through persistence are always `Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted but not yet processed.
    #[default]
    Received,

    /// Persisted by the pipeline.
    Processed,
}

impl OrderStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::Processed => "PROCESSED",
        }
    }

    /// Parses a wire name. Returns None for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RECEIVED" => Some(OrderStatus::Received),
            "PROCESSED" => Some(OrderStatus::Processed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(OrderStatus::Received.to_string(), "RECEIVED");
        assert_eq!(OrderStatus::Processed.to_string(), "PROCESSED");
    }

    #[test]
    fn test_parse_matches_display() {
        for status in [OrderStatus::Received, OrderStatus::Processed] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("processed"), None);
    }

    #[test]
    fn test_serializes_upper_case() {
        let json = serde_json::to_string(&OrderStatus::Processed).unwrap();
        assert_eq!(json, "\"PROCESSED\"");
    }
}
