//! Asset ownership registry.
//!
//! Assets live in an [`IdentityLedger`]. Ownership only changes through a
//! two-phase workflow: a principal holding [`Capability::User`] files a
//! [`TransferRequest`], and the asset's current owner approves it. Every
//! approval appends an [`OwnershipHistoryEntry`] and emits a
//! [`RegistryEvent`].

mod capability;
mod clock;
mod error;
mod event;
mod history;
mod ledger;
mod principal;
mod registry;
mod sequence;
mod transfer;

pub use capability::{AccessControlGate, Capability};
pub use clock::{Clock, LogicalClock, SystemClock};
pub use error::{RegistryError, Result};
pub use event::{EventSink, RegistryEvent};
pub use history::{HistoryLedger, OwnershipHistoryEntry};
pub use ledger::{Asset, AssetId, IdentityLedger, MemoryLedger};
pub use principal::{Principal, PrincipalParseError};
pub use registry::{AssetVerification, Registry, RegistryConfig};
pub use sequence::IdAllocator;
pub use transfer::{RequestId, RequestState, TransferRequest, TransferRequests};

use serde::{Deserialize, Serialize};

/// Summary a registry publishes about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Human-readable registry name.
    pub name: String,
    pub assets: usize,
    pub transfer_requests: usize,
    pub completed_transfers: usize,
}
