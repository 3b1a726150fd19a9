//! # API Request/Response Types
//!
//! JSON bodies of the RPC surface, plus the error type every handler
//! returns.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sphynx_core::{Guid, SphynxError};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `CanCompute` and `Compute`.
///
/// `operation` is the descriptor as JSON *text*, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
}

/// Body of every GUID-addressed RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidRequest {
    pub guid: Guid,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanComputeResponse {
    pub can_compute: bool,
}

/// Empty acknowledgement (`{}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AckResponse {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetScalarResponse {
    /// The scalar's value as JSON text.
    pub scalar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasInMemoryResponse {
    pub has_in_memory: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasOnDiskResponse {
    pub has_on_disk: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Body of every failed RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Engine error carried to the HTTP layer.
#[derive(Debug)]
pub struct ApiError(pub SphynxError);

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SphynxError::UnsupportedOperation(_) => StatusCode::NOT_IMPLEMENTED,
            SphynxError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            SphynxError::TypeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SphynxError::InvalidDescriptor(_)
            | SphynxError::InvalidParameter { .. }
            | SphynxError::UnknownSlot(_)
            | SphynxError::InvalidGuid(_) => StatusCode::BAD_REQUEST,
            SphynxError::ExternalProcessFailure { .. } => StatusCode::BAD_GATEWAY,
            SphynxError::CorruptEntity(_)
            | SphynxError::DuplicateOperation(_)
            | SphynxError::Io(_)
            | SphynxError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SphynxError> for ApiError {
    fn from(e: SphynxError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("RPC failed: {}", self.0);
        } else {
            tracing::debug!("RPC rejected: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
