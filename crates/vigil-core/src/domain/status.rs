//! Payment status as reported by the enrollment status endpoint.

use serde::{Deserialize, Serialize};

/// Payment status of an enrollment.
///
/// Transitions observed from the endpoint:
/// - Pending -> Pending (still waiting; the common case between polls)
/// - Pending -> Completed (payment settled)
/// - Pending -> Failed (payment rejected or aborted)
///
/// We intentionally serialize as SCREAMING_SNAKE_CASE to match the wire
/// format: PENDING / COMPLETED / FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Waiting for the payment provider to settle.
    Pending,

    /// Payment settled; the enrollment is active.
    Completed,

    /// Payment rejected or aborted.
    Failed,
}

impl PaymentStatus {
    /// Is this a terminal status (no further automatic change expected)?
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_required_names() {
        let s = serde_json::to_string(&PaymentStatus::Pending).unwrap();
        assert_eq!(s, "\"PENDING\"");

        let s = serde_json::to_string(&PaymentStatus::Completed).unwrap();
        assert_eq!(s, "\"COMPLETED\"");

        let s = serde_json::to_string(&PaymentStatus::Failed).unwrap();
        assert_eq!(s, "\"FAILED\"");
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }
}
