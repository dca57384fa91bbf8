//! Notifications for audit and monitoring observers.
//!
//! Emitted exactly once per successful operation and never on failure.

use crate::{AssetId, Principal, RequestId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A transfer request was filed.
    TransferRequested {
        request_id: RequestId,
        asset_id: AssetId,
        requester: Principal,
    },
    /// A transfer request was approved and ownership moved.
    TransferApproved {
        asset_id: AssetId,
        previous_owner: Principal,
        new_owner: Principal,
        timestamp: u64,
    },
}

/// Observer of registry notifications.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &RegistryEvent);
}

impl<F> EventSink for F
where
    F: Fn(&RegistryEvent) + Send + Sync,
{
    fn notify(&self, event: &RegistryEvent) {
        self(event)
    }
}
