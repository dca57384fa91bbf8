//! Transfer requests and their two-state lifecycle.
//!
//! A request starts `Pending` and can only move to `Approved`, once. There is
//! no withdraw or deny transition; a request nobody approves stays pending.

use crate::error::{RegistryError, Result};
use crate::sequence::IdAllocator;
use crate::{AssetId, Principal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Transfer request identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Pending,
    /// Terminal.
    Approved,
}

/// Intent to move an asset to `requester`. Kept forever as an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub id: RequestId,
    pub asset_id: AssetId,
    pub requester: Principal,
    pub approved: bool,
}

impl TransferRequest {
    pub fn state(&self) -> RequestState {
        if self.approved {
            RequestState::Approved
        } else {
            RequestState::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.approved
    }
}

/// Every request ever filed, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TransferRequests {
    requests: BTreeMap<RequestId, TransferRequest>,
    ids: IdAllocator,
}

impl TransferRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a new pending request. Asset existence is the caller's check.
    pub(crate) fn open(&mut self, asset_id: AssetId, requester: Principal) -> RequestId {
        let id = RequestId(self.ids.allocate());
        self.requests.insert(
            id,
            TransferRequest {
                id,
                asset_id,
                requester,
                approved: false,
            },
        );
        id
    }

    /// Flips a pending request to approved.
    pub(crate) fn approve(&mut self, id: RequestId) -> Result<&TransferRequest> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(RegistryError::RequestNotFound(id))?;
        if request.approved {
            return Err(RegistryError::AlreadyApproved(id));
        }
        request.approved = true;
        Ok(request)
    }

    pub fn get(&self, id: RequestId) -> Option<&TransferRequest> {
        self.requests.get(&id)
    }

    /// The id the next filed request will receive.
    pub fn next_id(&self) -> RequestId {
        RequestId(self.ids.peek())
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn pending_for(&self, asset_id: AssetId) -> impl Iterator<Item = &TransferRequest> {
        self.requests
            .values()
            .filter(move |r| r.asset_id == asset_id && r.is_pending())
    }
}
