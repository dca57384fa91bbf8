//! The registry: asset creation, the request/approve workflow and read-only
//! queries, all gated by the [`AccessControlGate`].
//!
//! Mutations take `&mut self` and run to completion before anything else can
//! observe the registry. Each one checks every precondition before touching
//! state, so a failed call changes nothing.

use crate::capability::{AccessControlGate, Capability};
use crate::clock::{Clock, LogicalClock};
use crate::error::{RegistryError, Result};
use crate::event::{EventSink, RegistryEvent};
use crate::history::{HistoryLedger, OwnershipHistoryEntry};
use crate::ledger::{AssetId, IdentityLedger, MemoryLedger};
use crate::sequence::IdAllocator;
use crate::transfer::{RequestId, TransferRequest, TransferRequests};
use crate::{Manifest, Principal};
use serde::{Deserialize, Serialize};

/// Initial capability grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The principal set up at startup.
    pub bootstrap: Principal,
    /// What `bootstrap` holds at startup. Both Admin and User by default.
    #[serde(default = "RegistryConfig::default_capabilities")]
    pub bootstrap_capabilities: Vec<Capability>,
}

impl RegistryConfig {
    pub fn new(bootstrap: Principal) -> Self {
        Self {
            bootstrap,
            bootstrap_capabilities: Self::default_capabilities(),
        }
    }

    fn default_capabilities() -> Vec<Capability> {
        vec![Capability::Admin, Capability::User]
    }
}

/// Result of [`Registry::verify_asset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetVerification {
    pub exists: bool,
    /// `None` when the asset does not exist.
    pub owner: Option<Principal>,
    /// Empty when the asset does not exist.
    pub metadata_uri: String,
}

impl AssetVerification {
    fn missing() -> Self {
        Self {
            exists: false,
            owner: None,
            metadata_uri: String::new(),
        }
    }
}

pub struct Registry<L = MemoryLedger> {
    ledger: L,
    gate: AccessControlGate,
    requests: TransferRequests,
    history: HistoryLedger,
    asset_ids: IdAllocator,
    clock: Box<dyn Clock>,
    sinks: Vec<Box<dyn EventSink>>,
    events: Vec<RegistryEvent>,
}

impl Registry<MemoryLedger> {
    /// A registry over a fresh in-memory ledger.
    pub fn in_memory(config: RegistryConfig) -> Self {
        Self::new(MemoryLedger::new(), config)
    }
}

impl<L: IdentityLedger> Registry<L> {
    pub fn new(ledger: L, config: RegistryConfig) -> Self {
        tracing::info!(
            "Bootstrapping registry: {} holds {:?}",
            config.bootstrap,
            config.bootstrap_capabilities
        );
        let gate = AccessControlGate::bootstrap(config.bootstrap, config.bootstrap_capabilities);
        Self::with_gate(ledger, gate)
    }

    /// A registry gated by an already populated `gate`.
    pub fn with_gate(ledger: L, gate: AccessControlGate) -> Self {
        Self {
            ledger,
            gate,
            requests: TransferRequests::new(),
            history: HistoryLedger::new(),
            asset_ids: IdAllocator::new(),
            clock: Box::new(LogicalClock::new()),
            sinks: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replace the timestamp source (logical ticks by default).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Register an observer for every notification emitted from now on.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn gate(&self) -> &AccessControlGate {
        &self.gate
    }

    /// Every notification emitted so far, oldest first.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    pub fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        self.gate.has_capability(principal, capability)
    }

    /// Grant `capability` to `principal`. Requires Admin.
    ///
    /// Returns false if the principal already held it.
    pub fn grant_capability(
        &mut self,
        caller: &Principal,
        principal: Principal,
        capability: Capability,
    ) -> Result<bool> {
        self.gate
            .require(caller, Capability::Admin)
            .inspect_err(|e| tracing::warn!("Grant by {} rejected: {}", caller, e))?;
        let granted = self.gate.grant(principal.clone(), capability);
        if granted {
            tracing::info!("{} granted {} to {}", caller, capability, principal);
        }
        Ok(granted)
    }

    /// Mint a new asset owned by `caller`. Requires User.
    pub fn create_asset(&mut self, caller: &Principal, uri: impl Into<String>) -> Result<AssetId> {
        let uri = uri.into();
        self.try_create_asset(caller, uri)
            .inspect_err(|e| tracing::warn!("Asset creation by {} rejected: {}", caller, e))
    }

    fn try_create_asset(&mut self, caller: &Principal, uri: String) -> Result<AssetId> {
        self.gate.require(caller, Capability::User)?;
        let id = AssetId(self.asset_ids.peek());
        self.ledger.mint(caller.clone(), id, uri)?;
        self.asset_ids.allocate();
        tracing::info!("Asset {} minted to {}", id, caller);
        Ok(id)
    }

    /// File a transfer request moving `asset_id` to `caller`. Requires User.
    ///
    /// A rejected request consumes no request id.
    pub fn request_transfer(&mut self, caller: &Principal, asset_id: AssetId) -> Result<RequestId> {
        self.try_request_transfer(caller, asset_id).inspect_err(|e| {
            tracing::warn!("Transfer request by {} for {} rejected: {}", caller, asset_id, e)
        })
    }

    fn try_request_transfer(&mut self, caller: &Principal, asset_id: AssetId) -> Result<RequestId> {
        self.gate.require(caller, Capability::User)?;
        if !self.ledger.exists(asset_id) {
            return Err(RegistryError::AssetNotFound(asset_id));
        }

        let request_id = self.requests.open(asset_id, caller.clone());
        tracing::info!(
            "Transfer request {} filed by {} for asset {}",
            request_id,
            caller,
            asset_id
        );
        self.emit(RegistryEvent::TransferRequested {
            request_id,
            asset_id,
            requester: caller.clone(),
        });
        Ok(request_id)
    }

    /// Approve a pending request, moving the asset to its requester.
    /// Requires User, and `caller` must own the asset at this moment.
    ///
    /// Checks run in this order: capability, request exists, asset exists,
    /// request still pending, caller is the current owner.
    pub fn approve_transfer(
        &mut self,
        caller: &Principal,
        request_id: RequestId,
    ) -> Result<OwnershipHistoryEntry> {
        self.try_approve_transfer(caller, request_id).inspect_err(|e| {
            tracing::warn!("Approval of {} by {} rejected: {}", request_id, caller, e)
        })
    }

    fn try_approve_transfer(
        &mut self,
        caller: &Principal,
        request_id: RequestId,
    ) -> Result<OwnershipHistoryEntry> {
        self.gate.require(caller, Capability::User)?;

        let request = self
            .requests
            .get(request_id)
            .ok_or(RegistryError::RequestNotFound(request_id))?;
        let asset_id = request.asset_id;
        let previous_owner = self
            .ledger
            .current_owner(asset_id)
            .ok_or(RegistryError::AssetNotFound(asset_id))?;
        if request.approved {
            return Err(RegistryError::AlreadyApproved(request_id));
        }
        if &previous_owner != caller {
            return Err(RegistryError::Forbidden {
                caller: caller.clone(),
                owner: previous_owner,
            });
        }
        let new_owner = request.requester.clone();

        self.ledger.reassign_owner(asset_id, new_owner.clone())?;
        self.requests.approve(request_id)?;

        let entry = OwnershipHistoryEntry {
            previous_owner,
            new_owner,
            timestamp: self.clock.now(),
        };
        self.history.append(asset_id, entry.clone());

        tracing::info!(
            "Asset {} transferred from {} to {} (request {})",
            asset_id,
            entry.previous_owner,
            entry.new_owner,
            request_id
        );
        self.emit(RegistryEvent::TransferApproved {
            asset_id,
            previous_owner: entry.previous_owner.clone(),
            new_owner: entry.new_owner.clone(),
            timestamp: entry.timestamp,
        });
        Ok(entry)
    }

    /// Existence, owner and metadata of an asset. Never fails: an unknown
    /// asset reports `exists: false`, no owner and an empty URI.
    pub fn verify_asset(&self, asset_id: AssetId) -> AssetVerification {
        match self.ledger.current_owner(asset_id) {
            Some(owner) => AssetVerification {
                exists: true,
                owner: Some(owner),
                metadata_uri: self.ledger.metadata_uri(asset_id).unwrap_or_default(),
            },
            None => AssetVerification::missing(),
        }
    }

    /// Completed transfers of an asset in approval order.
    ///
    /// Unlike [`verify_asset`](Self::verify_asset), this fails with
    /// [`RegistryError::AssetNotFound`] for an unknown asset. An asset that
    /// never changed hands yields an empty slice.
    pub fn history(&self, asset_id: AssetId) -> Result<&[OwnershipHistoryEntry]> {
        if !self.ledger.exists(asset_id) {
            return Err(RegistryError::AssetNotFound(asset_id));
        }
        Ok(self.history.entries(asset_id))
    }

    pub fn transfer_request(&self, request_id: RequestId) -> Option<&TransferRequest> {
        self.requests.get(request_id)
    }

    pub fn pending_requests(&self, asset_id: AssetId) -> Vec<&TransferRequest> {
        self.requests.pending_for(asset_id).collect()
    }

    /// The id the next successful transfer request will receive.
    pub fn next_request_id(&self) -> RequestId {
        self.requests.next_id()
    }

    pub fn total_assets(&self) -> usize {
        self.ledger.total_assets()
    }

    pub fn assets_owned_by(&self, owner: &Principal) -> Vec<AssetId> {
        self.ledger.assets_owned_by(owner)
    }

    pub fn manifest(&self, name: impl Into<String>) -> Manifest {
        Manifest {
            name: name.into(),
            assets: self.ledger.total_assets(),
            transfer_requests: self.requests.len(),
            completed_transfers: self.history.len(),
        }
    }

    fn emit(&mut self, event: RegistryEvent) {
        for sink in &self.sinks {
            sink.notify(&event);
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    fn admin() -> Principal {
        Principal::local("admin").unwrap()
    }

    fn u1() -> Principal {
        Principal::local("u1").unwrap()
    }

    fn u2() -> Principal {
        Principal::local("u2").unwrap()
    }

    /// Admin plus two User principals.
    fn registry() -> Registry {
        let mut registry = Registry::in_memory(RegistryConfig::new(admin()));
        registry
            .grant_capability(&admin(), u1(), Capability::User)
            .unwrap();
        registry
            .grant_capability(&admin(), u2(), Capability::User)
            .unwrap();
        registry
    }

    #[test]
    fn bootstrap_holds_both_capabilities() {
        let registry = Registry::in_memory(RegistryConfig::new(admin()));
        assert!(registry.has_capability(&admin(), Capability::Admin));
        assert!(registry.has_capability(&admin(), Capability::User));
        assert!(!registry.has_capability(&u1(), Capability::User));
    }

    #[test]
    fn bootstrap_grants_are_configurable() {
        let config = RegistryConfig {
            bootstrap: admin(),
            bootstrap_capabilities: vec![Capability::Admin],
        };
        let mut registry = Registry::in_memory(config);
        assert!(!registry.has_capability(&admin(), Capability::User));
        assert!(matches!(
            registry.create_asset(&admin(), "ipfs://x"),
            Err(RegistryError::Unauthorized { .. })
        ));
    }

    #[test]
    fn injected_gate() {
        let gate = AccessControlGate::bootstrap(u1(), [Capability::User]);
        let mut registry = Registry::with_gate(MemoryLedger::new(), gate);
        assert!(registry.create_asset(&u1(), "ipfs://x").is_ok());
        assert!(matches!(
            registry.grant_capability(&u1(), u2(), Capability::User),
            Err(RegistryError::Unauthorized { .. })
        ));
    }

    #[test]
    fn grant_requires_admin() {
        let mut registry = registry();
        let err = registry
            .grant_capability(&u1(), Principal::local("eve").unwrap(), Capability::User)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Unauthorized {
                principal: u1(),
                capability: Capability::Admin,
            }
        );
        assert!(!registry.has_capability(&Principal::local("eve").unwrap(), Capability::User));
        assert!(!registry
            .grant_capability(&admin(), u1(), Capability::User)
            .unwrap());
    }

    #[test]
    fn create_asset_requires_user() {
        let mut registry = registry();
        let eve = Principal::local("eve").unwrap();
        assert!(matches!(
            registry.create_asset(&eve, "ipfs://x"),
            Err(RegistryError::Unauthorized { .. })
        ));
        assert_eq!(registry.total_assets(), 0);

        let id = registry.create_asset(&u1(), "ipfs://x").unwrap();
        assert_eq!(id, AssetId(1));
        assert_eq!(registry.create_asset(&u1(), "ipfs://y").unwrap(), AssetId(2));
        assert_eq!(registry.assets_owned_by(&u1()), vec![AssetId(1), AssetId(2)]);
    }

    #[test]
    fn request_and_approve_scenario() {
        let mut registry = registry();
        let asset = registry.create_asset(&u1(), "ipfs://deed").unwrap();

        let request = registry.request_transfer(&u2(), asset).unwrap();
        assert_eq!(request, RequestId(1));
        assert!(registry.transfer_request(request).unwrap().is_pending());

        let entry = registry.approve_transfer(&u1(), request).unwrap();
        assert_eq!(entry.previous_owner, u1());
        assert_eq!(entry.new_owner, u2());

        assert_eq!(
            registry.verify_asset(asset),
            AssetVerification {
                exists: true,
                owner: Some(u2()),
                metadata_uri: "ipfs://deed".into(),
            }
        );
        assert_eq!(registry.history(asset).unwrap(), &[entry]);
        assert!(!registry.transfer_request(request).unwrap().is_pending());

        assert_eq!(
            registry.approve_transfer(&u1(), request),
            Err(RegistryError::AlreadyApproved(request))
        );
        assert_eq!(
            registry.approve_transfer(&u2(), request),
            Err(RegistryError::AlreadyApproved(request))
        );
        assert_eq!(registry.history(asset).unwrap().len(), 1);
    }

    #[test]
    fn request_against_unknown_asset() {
        let mut registry = registry();
        assert_eq!(
            registry.request_transfer(&u2(), AssetId(1)),
            Err(RegistryError::AssetNotFound(AssetId(1)))
        );
        assert_eq!(
            registry.history(AssetId(1)),
            Err(RegistryError::AssetNotFound(AssetId(1)))
        );
        // no id was consumed
        assert_eq!(registry.next_request_id(), RequestId(1));
        assert!(registry.events().is_empty());
    }

    #[test]
    fn request_requires_user() {
        let mut registry = registry();
        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        let eve = Principal::local("eve").unwrap();
        assert!(matches!(
            registry.request_transfer(&eve, asset),
            Err(RegistryError::Unauthorized { .. })
        ));
        assert_eq!(registry.next_request_id(), RequestId(1));
    }

    #[test]
    fn approval_by_non_owner_changes_nothing() {
        let mut registry = registry();
        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        let request = registry.request_transfer(&u2(), asset).unwrap();
        let events_before = registry.events().len();

        assert_eq!(
            registry.approve_transfer(&u2(), request),
            Err(RegistryError::Forbidden {
                caller: u2(),
                owner: u1(),
            })
        );
        assert!(registry.history(asset).unwrap().is_empty());
        assert!(registry.transfer_request(request).unwrap().is_pending());
        assert_eq!(registry.events().len(), events_before);
        assert_eq!(registry.verify_asset(asset).owner, Some(u1()));
    }

    #[test]
    fn approval_requires_user_capability() {
        let config = RegistryConfig {
            bootstrap: admin(),
            bootstrap_capabilities: vec![Capability::Admin],
        };
        let mut registry = Registry::in_memory(config);
        assert_eq!(
            registry.approve_transfer(&admin(), RequestId(1)),
            Err(RegistryError::Unauthorized {
                principal: admin(),
                capability: Capability::User,
            })
        );
    }

    #[test]
    fn unknown_request() {
        let mut registry = registry();
        assert_eq!(
            registry.approve_transfer(&u1(), RequestId(5)),
            Err(RegistryError::RequestNotFound(RequestId(5)))
        );
    }

    #[test]
    fn competing_requests_only_one_succeeds() {
        let mut registry = registry();
        let u3 = Principal::local("u3").unwrap();
        registry
            .grant_capability(&admin(), u3.clone(), Capability::User)
            .unwrap();
        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();

        let to_u2 = registry.request_transfer(&u2(), asset).unwrap();
        let to_u3 = registry.request_transfer(&u3, asset).unwrap();
        assert_eq!(registry.pending_requests(asset).len(), 2);

        registry.approve_transfer(&u1(), to_u2).unwrap();
        // u1 no longer owns the asset
        assert_eq!(
            registry.approve_transfer(&u1(), to_u3),
            Err(RegistryError::Forbidden {
                caller: u1(),
                owner: u2(),
            })
        );
        // the live owner may still approve the stale request
        registry.approve_transfer(&u2(), to_u3).unwrap();

        let history = registry.history(asset).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].new_owner, u2());
        assert_eq!(history[1].previous_owner, u2());
        assert_eq!(history[1].new_owner, u3);
        assert!(history[0].timestamp < history[1].timestamp);
    }

    /// Memory ledger whose assets can be made to disappear.
    struct RetractingLedger {
        inner: MemoryLedger,
        retracted: Arc<Mutex<BTreeSet<AssetId>>>,
    }

    impl RetractingLedger {
        fn visible(&self, id: AssetId) -> bool {
            !self.retracted.lock().unwrap().contains(&id)
        }
    }

    impl IdentityLedger for RetractingLedger {
        fn exists(&self, id: AssetId) -> bool {
            self.visible(id) && self.inner.exists(id)
        }

        fn current_owner(&self, id: AssetId) -> Option<Principal> {
            self.inner.current_owner(id).filter(|_| self.visible(id))
        }

        fn metadata_uri(&self, id: AssetId) -> Option<String> {
            self.inner.metadata_uri(id).filter(|_| self.visible(id))
        }

        fn reassign_owner(&mut self, id: AssetId, new_owner: Principal) -> Result<()> {
            if !self.visible(id) {
                return Err(RegistryError::AssetNotFound(id));
            }
            self.inner.reassign_owner(id, new_owner)
        }

        fn mint(&mut self, to: Principal, id: AssetId, uri: String) -> Result<()> {
            self.inner.mint(to, id, uri)
        }

        fn total_assets(&self) -> usize {
            let retracted = self.retracted.lock().unwrap();
            let hidden = retracted.iter().filter(|id| self.inner.exists(**id)).count();
            self.inner.total_assets() - hidden
        }

        fn assets_owned_by(&self, owner: &Principal) -> Vec<AssetId> {
            self.inner
                .assets_owned_by(owner)
                .into_iter()
                .filter(|id| self.visible(*id))
                .collect()
        }
    }

    #[test]
    fn approval_fails_once_asset_leaves_the_ledger() {
        let retracted = Arc::new(Mutex::new(BTreeSet::new()));
        let ledger = RetractingLedger {
            inner: MemoryLedger::new(),
            retracted: retracted.clone(),
        };
        let mut registry = Registry::new(ledger, RegistryConfig::new(admin()));
        registry
            .grant_capability(&admin(), u1(), Capability::User)
            .unwrap();
        registry
            .grant_capability(&admin(), u2(), Capability::User)
            .unwrap();

        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        let request = registry.request_transfer(&u2(), asset).unwrap();
        let events_before = registry.events().len();

        retracted.lock().unwrap().insert(asset);

        assert_eq!(
            registry.approve_transfer(&u1(), request),
            Err(RegistryError::AssetNotFound(asset))
        );
        assert!(registry.transfer_request(request).unwrap().is_pending());
        assert_eq!(registry.events().len(), events_before);
        assert!(!registry.verify_asset(asset).exists);
        assert_eq!(registry.total_assets(), 0);
        assert_eq!(
            registry.history(asset),
            Err(RegistryError::AssetNotFound(asset))
        );
        assert_eq!(
            registry.request_transfer(&u2(), asset),
            Err(RegistryError::AssetNotFound(asset))
        );

        retracted.lock().unwrap().clear();
        assert_eq!(registry.total_assets(), 1);
        assert!(registry.history(asset).unwrap().is_empty());
        assert_eq!(registry.verify_asset(asset).owner, Some(u1()));
    }

    #[test]
    fn verify_unknown_asset_is_total() {
        let registry = registry();
        assert_eq!(
            registry.verify_asset(AssetId(42)),
            AssetVerification {
                exists: false,
                owner: None,
                metadata_uri: String::new(),
            }
        );
    }

    #[test]
    fn fresh_asset_has_empty_history() {
        let mut registry = registry();
        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        assert!(registry.history(asset).unwrap().is_empty());
    }

    #[test]
    fn notifications_emitted_once_per_success() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = registry();
        let sink = seen.clone();
        registry.subscribe(move |event: &RegistryEvent| {
            sink.lock().unwrap().push(event.clone());
        });

        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        let request = registry.request_transfer(&u2(), asset).unwrap();
        assert!(matches!(
            registry.approve_transfer(&u2(), request),
            Err(RegistryError::Forbidden { .. })
        ));
        let entry = registry.approve_transfer(&u1(), request).unwrap();
        assert_eq!(
            registry.approve_transfer(&u1(), request),
            Err(RegistryError::AlreadyApproved(request))
        );

        let expected = vec![
            RegistryEvent::TransferRequested {
                request_id: request,
                asset_id: asset,
                requester: u2(),
            },
            RegistryEvent::TransferApproved {
                asset_id: asset,
                previous_owner: u1(),
                new_owner: u2(),
                timestamp: entry.timestamp,
            },
        ];
        assert_eq!(*seen.lock().unwrap(), expected);
        assert_eq!(registry.events(), expected.as_slice());
    }

    #[test]
    fn custom_clock_stamps_history() {
        struct Fixed(u64);
        impl Clock for Fixed {
            fn now(&mut self) -> u64 {
                self.0
            }
        }

        let mut registry = registry().with_clock(Fixed(1_700_000_000));
        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        let request = registry.request_transfer(&u2(), asset).unwrap();
        let entry = registry.approve_transfer(&u1(), request).unwrap();
        assert_eq!(entry.timestamp, 1_700_000_000);

        let mut registry = self::registry();
        let asset = registry.create_asset(&u1(), "ipfs://a").unwrap();
        let request = registry.request_transfer(&u2(), asset).unwrap();
        assert_eq!(registry.approve_transfer(&u1(), request).unwrap().timestamp, 1);
    }

    /// Total history entries across the three assets the property test mints.
    fn recorded_transfers(registry: &Registry) -> usize {
        (1..=3)
            .map(|id| registry.history(AssetId(id)).map_or(0, |h| h.len()))
            .sum()
    }

    #[derive(Debug, Clone)]
    enum Op {
        Request { who: usize, asset: u64 },
        Approve { who: usize, request: u64 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..3usize, 1..5u64).prop_map(|(who, asset)| Op::Request { who, asset }),
            (0..3usize, 1..12u64).prop_map(|(who, request)| Op::Approve { who, request }),
        ]
    }

    proptest! {
        #[test]
        fn history_matches_successful_approvals(ops in proptest::collection::vec(op(), 0..40)) {
            let users = [u1(), u2(), Principal::local("u3").unwrap()];
            let mut registry = registry();
            registry.grant_capability(&admin(), users[2].clone(), Capability::User).unwrap();
            // assets 1..=3 exist, asset 4 never does
            for owner in &users {
                registry.create_asset(owner, "ipfs://p").unwrap();
            }

            let mut approved = std::collections::HashMap::<AssetId, usize>::new();
            for op in ops {
                match op {
                    Op::Request { who, asset } => {
                        let next = registry.next_request_id();
                        match registry.request_transfer(&users[who], AssetId(asset)) {
                            Ok(id) => {
                                prop_assert_eq!(id, next);
                            }
                            Err(e) => {
                                prop_assert_eq!(e, RegistryError::AssetNotFound(AssetId(asset)));
                                prop_assert_eq!(registry.next_request_id(), next);
                            }
                        }
                    }
                    Op::Approve { who, request } => {
                        let before = registry.transfer_request(RequestId(request)).cloned();
                        let transfers_before = recorded_transfers(&registry);
                        let events_before = registry.events().len();
                        match registry.approve_transfer(&users[who], RequestId(request)) {
                            Ok(_) => {
                                let before = before.unwrap();
                                prop_assert!(before.is_pending());
                                *approved.entry(before.asset_id).or_default() += 1;
                            }
                            Err(_) => {
                                let after = registry.transfer_request(RequestId(request)).cloned();
                                prop_assert_eq!(before, after);
                                prop_assert_eq!(recorded_transfers(&registry), transfers_before);
                                prop_assert_eq!(registry.events().len(), events_before);
                            }
                        }
                    }
                }
            }

            prop_assert!(!registry.verify_asset(AssetId(4)).exists);
            for asset in 1..=3 {
                let asset = AssetId(asset);
                let history = registry.history(asset).unwrap();
                prop_assert_eq!(history.len(), approved.get(&asset).copied().unwrap_or(0));
                // each entry picks up where the previous left off
                for pair in history.windows(2) {
                    prop_assert_eq!(&pair[0].new_owner, &pair[1].previous_owner);
                    prop_assert!(pair[0].timestamp < pair[1].timestamp);
                }
                if let Some(last) = history.last() {
                    let owner = registry.verify_asset(asset).owner;
                    prop_assert_eq!(owner.as_ref(), Some(&last.new_owner));
                }
            }
        }
    }
}
