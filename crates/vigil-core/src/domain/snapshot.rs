//! Status snapshot: the shape of one poll result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::PaymentStatus;

/// The latest payment status for an enrollment, as fetched from the endpoint.
///
/// Read-only for this crate: a new snapshot replaces the previous one
/// wholesale, nothing is merged.
///
/// Wire format is camelCase (`expiryTime`) to match the endpoint's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusSnapshot {
    pub status: PaymentStatus,

    /// When the payment session expires. Absent while the provider has not
    /// issued a deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
}

impl PaymentStatusSnapshot {
    pub fn new(status: PaymentStatus, expiry_time: Option<DateTime<Utc>>) -> Self {
        Self {
            status,
            expiry_time,
        }
    }

    /// Snapshot with just a status (no expiry from the provider).
    pub fn status_only(status: PaymentStatus) -> Self {
        Self::new(status, None)
    }
}
