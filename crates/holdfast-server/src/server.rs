//! HTTP server over a single registry.
//!
//! The caller's principal travels in the `x-principal` header. Every mutating
//! handler holds the write lock for the whole operation, so mutations are
//! applied one at a time in the order the lock grants them.

use crate::config::{ClockKind, Config};
use crate::protocol::{
    ApiError, AssetCreated, CapabilityGranted, CreateAsset, GrantCapability, PrincipalRoles,
    RequestStatus, RequestTransfer, TransferRequested,
};
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use holdfast_core::{
    AssetId, AssetVerification, Capability, Manifest, OwnershipHistoryEntry, Principal, Registry,
    RegistryConfig, RegistryEvent, RequestId, SystemClock, TransferRequest,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub const PRINCIPAL_HEADER: &str = "x-principal";

pub struct ServerState {
    name: String,
    registry: Registry,
}

impl ServerState {
    pub fn new(name: String, registry: Registry) -> Self {
        Self { name, registry }
    }
}

pub type AppState = Arc<RwLock<ServerState>>;

/// Build the registry described by `config`, granting User to each
/// configured user on behalf of the bootstrap principal.
pub fn build_registry(config: &Config) -> anyhow::Result<Registry> {
    let registry = Registry::in_memory(RegistryConfig::new(config.bootstrap.clone()));
    let mut registry = match config.clock {
        ClockKind::Logical => registry,
        ClockKind::System => registry.with_clock(SystemClock::default()),
    };
    for user in &config.users {
        registry.grant_capability(&config.bootstrap, user.clone(), Capability::User)?;
    }
    Ok(registry)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let mut registry = build_registry(&config)?;

    let (events_tx, events_rx) = broadcast::channel::<RegistryEvent>(64);
    registry.subscribe(move |event: &RegistryEvent| {
        // no receiver just means nobody is auditing right now
        let _ = events_tx.send(event.clone());
    });
    tokio::spawn(audit(events_rx));

    let state = Arc::new(RwLock::new(ServerState::new(config.name.clone(), registry)));
    let app = router(state);

    let addr = SocketAddr::new(config.address, config.port);
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Log every notification the registry emits.
async fn audit(mut events: broadcast::Receiver<RegistryEvent>) {
    loop {
        match events.recv().await {
            Ok(RegistryEvent::TransferRequested {
                request_id,
                asset_id,
                requester,
            }) => {
                tracing::info!(target: "holdfast::audit", %request_id, %asset_id, %requester, "transfer requested");
            }
            Ok(RegistryEvent::TransferApproved {
                asset_id,
                previous_owner,
                new_owner,
                timestamp,
            }) => {
                tracing::info!(target: "holdfast::audit", %asset_id, %previous_owner, %new_owner, timestamp, "transfer approved");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Audit log fell behind, {} notifications skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/manifest", get(get_manifest))
        .route("/assets", post(create_asset))
        .route("/assets/{id}", get(verify_asset))
        .route("/assets/{id}/history", get(get_history))
        .route("/assets/{id}/requests", get(pending_requests))
        .route("/principals/{principal}/assets", get(assets_of))
        .route("/principals/{principal}/roles", get(roles_of))
        .route("/requests", post(request_transfer))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/approve", post(approve_transfer))
        .route("/roles", post(grant_capability))
        .route("/events", get(list_events))
        .with_state(state)
}

/// The authenticated caller, read from [`PRINCIPAL_HEADER`].
pub struct Caller(pub Principal);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .ok_or_else(|| ApiError::unauthenticated(format!("missing {PRINCIPAL_HEADER} header")))?;
        let value = value
            .to_str()
            .map_err(|_| ApiError::unauthenticated("principal header is not valid text"))?;
        let principal = value
            .parse::<Principal>()
            .map_err(|e| ApiError::unauthenticated(format!("{e}")))?;
        Ok(Caller(principal))
    }
}

async fn get_manifest(State(state): State<AppState>) -> Json<Manifest> {
    let s = state.read().await;
    Json(s.registry.manifest(s.name.clone()))
}

async fn create_asset(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<CreateAsset>,
) -> Result<(StatusCode, Json<AssetCreated>), ApiError> {
    let mut s = state.write().await;
    let asset_id = s.registry.create_asset(&caller, req.metadata_uri)?;
    Ok((StatusCode::CREATED, Json(AssetCreated { asset_id })))
}

async fn verify_asset(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<AssetVerification> {
    let s = state.read().await;
    Json(s.registry.verify_asset(AssetId(id)))
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<OwnershipHistoryEntry>>, ApiError> {
    let s = state.read().await;
    let history = s.registry.history(AssetId(id))?;
    Ok(Json(history.to_vec()))
}

async fn pending_requests(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<TransferRequest>>, ApiError> {
    let s = state.read().await;
    let asset_id = AssetId(id);
    if !s.registry.verify_asset(asset_id).exists {
        return Err(holdfast_core::RegistryError::AssetNotFound(asset_id).into());
    }
    let pending = s
        .registry
        .pending_requests(asset_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(pending))
}

fn parse_principal(raw: &str) -> Result<Principal, ApiError> {
    raw.parse::<Principal>()
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "bad_principal", format!("{e}")))
}

async fn assets_of(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<Vec<AssetId>>, ApiError> {
    let principal = parse_principal(&principal)?;
    let s = state.read().await;
    Ok(Json(s.registry.assets_owned_by(&principal)))
}

async fn roles_of(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<PrincipalRoles>, ApiError> {
    let principal = parse_principal(&principal)?;
    let s = state.read().await;
    let capabilities = s.registry.gate().capabilities_of(&principal);
    Ok(Json(PrincipalRoles {
        principal,
        capabilities,
    }))
}

async fn request_transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<RequestTransfer>,
) -> Result<(StatusCode, Json<TransferRequested>), ApiError> {
    let mut s = state.write().await;
    let request_id = s.registry.request_transfer(&caller, req.asset_id)?;
    Ok((StatusCode::CREATED, Json(TransferRequested { request_id })))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<RequestStatus>, ApiError> {
    let s = state.read().await;
    let request_id = RequestId(id);
    let request = s
        .registry
        .transfer_request(request_id)
        .ok_or(holdfast_core::RegistryError::RequestNotFound(request_id))?;
    Ok(Json(RequestStatus::from(request)))
}

async fn approve_transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<u64>,
) -> Result<Json<OwnershipHistoryEntry>, ApiError> {
    let mut s = state.write().await;
    let entry = s.registry.approve_transfer(&caller, RequestId(id))?;
    Ok(Json(entry))
}

async fn grant_capability(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<GrantCapability>,
) -> Result<Json<CapabilityGranted>, ApiError> {
    let mut s = state.write().await;
    let granted = s
        .registry
        .grant_capability(&caller, req.principal, req.capability)?;
    Ok(Json(CapabilityGranted { granted }))
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<RegistryEvent>> {
    let s = state.read().await;
    Json(s.registry.events().to_vec())
}
