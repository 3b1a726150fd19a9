//! # API Endpoint Handlers
//!
//! One handler per RPC. Anything that may block (operation bodies, disk
//! reads) runs on the blocking pool.

use super::{
    AppState,
    types::{
        AckResponse, ApiError, CanComputeResponse, GetScalarResponse, GuidRequest,
        HasInMemoryResponse, HasOnDiskResponse, HealthResponse, OperationRequest,
    },
};
use axum::{Json, extract::State, response::IntoResponse};
use sphynx_core::{Engine, SphynxError};
use std::sync::Arc;

/// Run `f` against the engine on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Engine) -> Result<T, SphynxError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|e| SphynxError::Io(format!("Worker task failed: {}", e)))?;
    Ok(result?)
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// DISPATCH HANDLERS
// =============================================================================

/// `CanCompute`: is the operation in the registry?
pub async fn can_compute_handler(
    State(state): State<AppState>,
    Json(request): Json<OperationRequest>,
) -> Result<Json<CanComputeResponse>, ApiError> {
    let can_compute = state.engine.can_compute(&request.operation)?;
    Ok(Json(CanComputeResponse { can_compute }))
}

/// `Compute`: run the operation, merge outputs, schedule persistence.
///
/// Compute and enqueue run as one detached task, so outputs merged into
/// memory are queued for disk even if the caller goes away mid-request.
/// The reply does not wait for disk writes; it only waits for queue space.
pub async fn compute_handler(
    State(state): State<AppState>,
    Json(request): Json<OperationRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let persister = state.persister.clone();
    let task = tokio::spawn(async move {
        let persist = tokio::task::spawn_blocking(move || engine.compute(&request.operation))
            .await
            .map_err(|e| SphynxError::Io(format!("Worker task failed: {}", e)))??;
        persister.enqueue(persist).await;
        Ok::<(), SphynxError>(())
    });

    task.await
        .map_err(|e| SphynxError::Io(format!("Compute task failed: {}", e)))??;
    Ok(Json(AckResponse::default()))
}

// =============================================================================
// ENTITY HANDLERS
// =============================================================================

/// `GetScalar`: the scalar's value as JSON text.
pub async fn get_scalar_handler(
    State(state): State<AppState>,
    Json(request): Json<GuidRequest>,
) -> Result<Json<GetScalarResponse>, ApiError> {
    let scalar = state.engine.get_scalar(&request.guid)?;
    Ok(Json(GetScalarResponse { scalar }))
}

/// `HasInSphynxMemory`.
pub async fn has_in_memory_handler(
    State(state): State<AppState>,
    Json(request): Json<GuidRequest>,
) -> Json<HasInMemoryResponse> {
    Json(HasInMemoryResponse {
        has_in_memory: state.engine.has_in_memory(&request.guid),
    })
}

/// `HasOnOrderedSphynxDisk`.
pub async fn has_on_disk_handler(
    State(state): State<AppState>,
    Json(request): Json<GuidRequest>,
) -> Result<Json<HasOnDiskResponse>, ApiError> {
    let has_on_disk =
        blocking(&state, move |engine| engine.has_on_ordered_disk(&request.guid)).await?;
    Ok(Json(HasOnDiskResponse { has_on_disk }))
}

/// `ReadFromOrderedSphynxDisk`: promote into memory.
pub async fn read_from_disk_handler(
    State(state): State<AppState>,
    Json(request): Json<GuidRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    blocking(&state, move |engine| engine.read_from_ordered_disk(&request.guid)).await?;
    Ok(Json(AckResponse::default()))
}
