//! Status enums.

use serde::{Deserialize, Serialize};

/// Externally visible phase of the checkout state machine.
///
/// `Success` and `Failed` are transient: the orchestrator passes through them
/// on its way back to `Idle`, so a caller reading the status between
/// operations sees `Idle` or `AwaitingProvider`. The last terminal phase is
/// kept separately as the attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    #[default]
    Idle,
    Preparing,
    AwaitingProvider,
    Success,
    Failed,
}

impl CheckoutStatus {
    /// Whether the status is a resting state (no attempt being built).
    #[must_use]
    pub const fn is_resting(&self) -> bool {
        matches!(self, Self::Idle | Self::AwaitingProvider)
    }
}

/// Whether the cart snapshot is actually being persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Durability {
    /// The last load or save reached the snapshot store.
    #[default]
    Durable,
    /// The last load or save failed; the cart lives in memory only.
    Degraded(String),
}

impl Durability {
    /// Returns `true` if the last persistence operation succeeded.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Durable)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_status_serde() {
        let json = serde_json::to_string(&CheckoutStatus::AwaitingProvider).unwrap();
        assert_eq!(json, "\"awaiting_provider\"");
    }

    #[test]
    fn test_resting_states() {
        assert!(CheckoutStatus::Idle.is_resting());
        assert!(CheckoutStatus::AwaitingProvider.is_resting());
        assert!(!CheckoutStatus::Preparing.is_resting());
    }

    #[test]
    fn test_durability_serde() {
        let json = serde_json::to_string(&Durability::Degraded("disk full".into())).unwrap();
        assert_eq!(json, r#"{"status":"degraded","reason":"disk full"}"#);
        let json = serde_json::to_string(&Durability::Durable).unwrap();
        assert_eq!(json, r#"{"status":"durable"}"#);
    }
}
