//! Request and response bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use holdfast_core::{
    AssetId, Capability, Principal, RegistryError, RequestId, RequestState, TransferRequest,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    pub metadata_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCreated {
    pub asset_id: AssetId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTransfer {
    pub asset_id: AssetId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequested {
    pub request_id: RequestId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantCapability {
    pub principal: Principal,
    pub capability: Capability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityGranted {
    /// False if the principal already held the capability.
    pub granted: bool,
}

/// A transfer request together with its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStatus {
    #[serde(flatten)]
    pub request: TransferRequest,
    pub state: RequestState,
}

impl From<&TransferRequest> for RequestStatus {
    fn from(request: &TransferRequest) -> Self {
        Self {
            request: request.clone(),
            state: request.state(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalRoles {
    pub principal: Principal,
    pub capabilities: Vec<Capability>,
}

/// Error frame returned for every rejected call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A rejected call, ready to be turned into a response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        let status = match error {
            RegistryError::Unauthorized { .. } | RegistryError::Forbidden { .. } => {
                StatusCode::FORBIDDEN
            }
            RegistryError::AssetNotFound(_) | RegistryError::RequestNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RegistryError::AlreadyApproved(_) | RegistryError::AssetAlreadyExists(_) => {
                StatusCode::CONFLICT
            }
        };
        Self::new(status, error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
