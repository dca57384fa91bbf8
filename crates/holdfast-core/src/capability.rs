//! Capabilities and the gate that answers "does P hold C?".
//!
//! Capabilities are a flat set. Admin does not imply User.

use crate::error::{RegistryError, Result};
use crate::Principal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A named permission a principal may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May grant capabilities to other principals.
    Admin,
    /// May create assets, file transfer requests and approve them.
    User,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Admin => "admin",
            Capability::User => "user",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from principal to the capabilities it holds.
#[derive(Debug, Clone, Default)]
pub struct AccessControlGate {
    grants: HashMap<Principal, BTreeSet<Capability>>,
}

impl AccessControlGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate where `principal` already holds `capabilities`.
    pub fn bootstrap(principal: Principal, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        let mut gate = Self::new();
        for capability in capabilities {
            gate.grant(principal.clone(), capability);
        }
        gate
    }

    pub fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        self.grants
            .get(principal)
            .is_some_and(|held| held.contains(&capability))
    }

    /// Fails with [`RegistryError::Unauthorized`] unless `principal` holds `capability`.
    pub fn require(&self, principal: &Principal, capability: Capability) -> Result<()> {
        if self.has_capability(principal, capability) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                principal: principal.clone(),
                capability,
            })
        }
    }

    /// Returns false if the capability was already held.
    pub(crate) fn grant(&mut self, principal: Principal, capability: Capability) -> bool {
        self.grants.entry(principal).or_default().insert(capability)
    }

    pub fn capabilities_of(&self, principal: &Principal) -> Vec<Capability> {
        self.grants
            .get(principal)
            .map(|held| held.iter().copied().collect())
            .unwrap_or_default()
    }
}
