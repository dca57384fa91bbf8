//! Append-only ownership history, one sequence per asset.

use crate::{AssetId, Principal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One completed ownership change. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipHistoryEntry {
    pub previous_owner: Principal,
    pub new_owner: Principal,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: HashMap<AssetId, Vec<OwnershipHistoryEntry>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// There is no update or removal counterpart.
    pub(crate) fn append(&mut self, asset_id: AssetId, entry: OwnershipHistoryEntry) {
        self.entries.entry(asset_id).or_default().push(entry);
    }

    /// Entries in append order. Empty for an asset that never changed hands;
    /// whether the asset exists at all is the registry's question.
    pub fn entries(&self, asset_id: AssetId) -> &[OwnershipHistoryEntry] {
        self.entries
            .get(&asset_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of recorded transfers across all assets.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
