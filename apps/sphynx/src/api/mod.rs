//! # Sphynx RPC Module
//!
//! The RPC surface of the engine, served as JSON over HTTP with axum.
//!
//! ## Endpoints
//!
//! - `POST /can_compute` - Is the operation registered?
//! - `POST /compute` - Run an operation
//! - `POST /get_scalar` - Read a scalar as JSON text
//! - `POST /has_in_sphynx_memory` - Memory probe
//! - `POST /has_on_ordered_sphynx_disk` - Disk probe
//! - `POST /read_from_ordered_sphynx_disk` - Promote from disk into memory
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `SPHYNX_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod types;

pub use auth::{ApiKey, ENV_API_KEY, get_api_key_from_env};
// Re-export handlers and types for integration tests (via `sphynx::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    can_compute_handler, compute_handler, get_scalar_handler, has_in_memory_handler,
    has_on_disk_handler, health_handler, read_from_disk_handler,
};
pub use types::{
    AckResponse, ApiError, CanComputeResponse, ErrorResponse, GetScalarResponse, GuidRequest,
    HasInMemoryResponse, HasOnDiskResponse, HealthResponse, OperationRequest,
};

use crate::config::ServerConfig;
use crate::persist::Persister;
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use sphynx_core::{Engine, EntityStore, OperationRegistry, SphynxError};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Maximum request body (2 MB). Descriptors are small.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub persister: Persister,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Arc<Engine>, persister: Persister) -> Self {
        Self { engine, persister }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. Body limit
/// 3. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let api_key = get_api_key_from_env();
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set {} to enable authentication.",
            ENV_API_KEY
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/can_compute", post(handlers::can_compute_handler))
        .route("/compute", post(handlers::compute_handler))
        .route("/get_scalar", post(handlers::get_scalar_handler))
        .route("/has_in_sphynx_memory", post(handlers::has_in_memory_handler))
        .route(
            "/has_on_ordered_sphynx_disk",
            post(handlers::has_on_disk_handler),
        )
        .route(
            "/read_from_ordered_sphynx_disk",
            post(handlers::read_from_disk_handler),
        );

    if let Some(key) = api_key {
        router = router.layer(axum_middleware::from_fn_with_state(
            key,
            auth::api_key_auth_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the server and block until Ctrl+C.
///
/// On shutdown, queued persistence jobs are drained before returning.
pub async fn run_server(config: &ServerConfig) -> Result<(), SphynxError> {
    let store = Arc::new(EntityStore::open(
        &config.data_dir,
        &config.unordered_data_dir,
    )?);
    let registry = OperationRegistry::standard(&config.operations())?;
    tracing::info!(
        "Registered operations: {}",
        registry.names().collect::<Vec<_>>().join(", ")
    );

    let engine = Arc::new(Engine::new(Arc::clone(&store), registry));
    let (persister, workers) = Persister::spawn(
        store,
        config.persist_workers,
        config.persist_queue_capacity,
    );
    let router = create_router(AppState::new(engine, persister));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SphynxError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Sphynx server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SphynxError::Io(format!("Server error: {}", e)))?;

    tracing::info!("Draining persistence queue");
    for worker in workers {
        if let Err(e) = worker.await {
            tracing::error!("Persistence worker failed: {}", e);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
