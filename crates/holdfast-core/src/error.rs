//! Registry errors.
//!
//! Every rejected operation leaves the registry untouched; the error says which
//! precondition failed.

use crate::{AssetId, Capability, Principal, RequestId};

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{principal} does not hold the {capability} capability")]
    Unauthorized {
        principal: Principal,
        capability: Capability,
    },
    #[error("asset {0} does not exist")]
    AssetNotFound(AssetId),
    #[error("transfer request {0} does not exist")]
    RequestNotFound(RequestId),
    #[error("{caller} is not the current owner of the asset (owner is {owner})")]
    Forbidden { caller: Principal, owner: Principal },
    #[error("transfer request {0} has already been approved")]
    AlreadyApproved(RequestId),
    #[error("asset {0} already exists")]
    AssetAlreadyExists(AssetId),
}

impl RegistryError {
    /// Stable machine-readable code, used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Unauthorized { .. } => "unauthorized",
            RegistryError::AssetNotFound(_) => "asset_not_found",
            RegistryError::RequestNotFound(_) => "request_not_found",
            RegistryError::Forbidden { .. } => "forbidden",
            RegistryError::AlreadyApproved(_) => "already_approved",
            RegistryError::AssetAlreadyExists(_) => "asset_already_exists",
        }
    }
}
