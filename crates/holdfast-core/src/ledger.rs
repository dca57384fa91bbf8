//! The asset substrate: identity, metadata and the raw owner-reassignment
//! primitive.
//!
//! The registry performs every authorization check before it calls into a
//! ledger; implementations only keep the asset records consistent.

use crate::error::{RegistryError, Result};
use crate::Principal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique, immutable asset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An asset record as the substrate stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub owner: Principal,
    pub metadata_uri: String,
}

/// Interface consumed from the asset substrate.
pub trait IdentityLedger: Send + Sync {
    fn exists(&self, id: AssetId) -> bool;

    /// `None` when the asset does not exist.
    fn current_owner(&self, id: AssetId) -> Option<Principal>;

    /// `None` when the asset does not exist.
    fn metadata_uri(&self, id: AssetId) -> Option<String>;

    /// Unconditionally moves `id` to `new_owner`. Callers are responsible for
    /// authorization.
    fn reassign_owner(&mut self, id: AssetId, new_owner: Principal) -> Result<()>;

    /// Binds a fresh identifier to `to`. Fails if `id` is already assigned.
    fn mint(&mut self, to: Principal, id: AssetId, uri: String) -> Result<()>;

    fn total_assets(&self) -> usize;

    /// Assets currently held by `owner`, in identifier order.
    fn assets_owned_by(&self, owner: &Principal) -> Vec<AssetId>;
}

/// In-process ledger backed by an ordered map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    assets: BTreeMap<AssetId, Asset>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityLedger for MemoryLedger {
    fn exists(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    fn current_owner(&self, id: AssetId) -> Option<Principal> {
        self.assets.get(&id).map(|a| a.owner.clone())
    }

    fn metadata_uri(&self, id: AssetId) -> Option<String> {
        self.assets.get(&id).map(|a| a.metadata_uri.clone())
    }

    fn reassign_owner(&mut self, id: AssetId, new_owner: Principal) -> Result<()> {
        let asset = self
            .assets
            .get_mut(&id)
            .ok_or(RegistryError::AssetNotFound(id))?;
        asset.owner = new_owner;
        Ok(())
    }

    fn mint(&mut self, to: Principal, id: AssetId, uri: String) -> Result<()> {
        if self.assets.contains_key(&id) {
            return Err(RegistryError::AssetAlreadyExists(id));
        }
        self.assets.insert(
            id,
            Asset {
                id,
                owner: to,
                metadata_uri: uri,
            },
        );
        Ok(())
    }

    fn total_assets(&self) -> usize {
        self.assets.len()
    }

    fn assets_owned_by(&self, owner: &Principal) -> Vec<AssetId> {
        self.assets
            .values()
            .filter(|a| &a.owner == owner)
            .map(|a| a.id)
            .collect()
    }
}
