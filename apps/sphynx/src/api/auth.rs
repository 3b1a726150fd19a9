//! # Authentication Module
//!
//! Optional shared-key authentication for the Sphynx RPC surface.
//!
//! ## Configuration
//!
//! - `SPHYNX_API_KEY`: If set, every request except `/health` must carry it
//!
//! The key is read once when the router is built.
//!
//! ## Usage
//!
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const ENV_API_KEY: &str = "SPHYNX_API_KEY";

/// Expected key, shared by every request.
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    /// Constant-time comparison over equal-length padded buffers.
    #[must_use]
    pub fn matches(&self, provided: &str) -> bool {
        let provided_bytes = provided.as_bytes();
        let expected_bytes = self.0.as_bytes();

        let max_len = provided_bytes.len().max(expected_bytes.len());
        let mut padded_provided = vec![0u8; max_len];
        let mut padded_expected = vec![0u8; max_len];
        padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
        padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

        let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
        bytes_match && provided_bytes.len() == expected_bytes.len()
    }
}

/// Get the API key from the environment.
///
/// Returns `None` when `SPHYNX_API_KEY` is unset or empty, which disables
/// authentication.
pub fn get_api_key_from_env() -> Option<ApiKey> {
    std::env::var(ENV_API_KEY)
        .ok()
        .filter(|k| !k.is_empty())
        .map(|k| ApiKey::new(&k))
}

/// API key authentication middleware.
///
/// Accepts `Authorization: Bearer <key>` or the raw key. `/health` is
/// always allowed.
pub async fn api_key_auth_middleware(
    State(expected): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) => {
            let provided_key = header_value.strip_prefix("Bearer ").unwrap_or(header_value);
            if expected.matches(provided_key) {
                Ok(next.run(request).await)
            } else {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "invalid_api_key",
                    path = %request.uri().path(),
                    "Authentication failed: invalid API key"
                );
                Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                path = %request.uri().path(),
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
