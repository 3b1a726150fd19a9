//! # Sphynx HTTP Client
//!
//! Typed wrapper around the Sphynx RPC surface.
//!
//! ```no_run
//! # async fn demo() -> Result<(), sphynx_client::ClientError> {
//! use sphynx_client::SphynxClient;
//! use sphynx_core::{Guid, OperationDescriptor};
//!
//! let client = SphynxClient::new("http://localhost:8080", None);
//! let descriptor = OperationDescriptor::new("ExampleGraph")
//!     .output("greeting", "g1")
//!     .to_json()
//!     .map_err(|e| sphynx_client::ClientError::ParseError(e.to_string()))?;
//! client.compute(&descriptor).await?;
//! let greeting = client.get_scalar(&Guid::new("g1")).await?;
//! # let _ = greeting;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use sphynx_core::Guid;

/// Errors from the HTTP client layer.
#[derive(Debug)]
pub enum ClientError {
    /// Cannot reach the Sphynx server.
    ConnectionFailed(String),
    /// 401 Unauthorized - invalid or missing API key.
    Unauthorized,
    /// The server answered the RPC with an error.
    Rpc {
        status: u16,
        kind: String,
        message: String,
    },
    /// Failed to parse response body.
    ParseError(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(url) => write!(f, "Cannot connect to Sphynx at {url}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing API key"),
            Self::Rpc {
                status,
                kind,
                message,
            } => write!(f, "{kind} ({status}): {message}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    kind: String,
}

#[derive(Deserialize)]
struct CanCompute {
    can_compute: bool,
}

#[derive(Deserialize)]
struct Scalar {
    scalar: String,
}

#[derive(Deserialize)]
struct InMemory {
    has_in_memory: bool,
}

#[derive(Deserialize)]
struct OnDisk {
    has_on_disk: bool,
}

/// HTTP client that wraps calls to the Sphynx RPC surface.
#[derive(Clone)]
pub struct SphynxClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SphynxClient {
    /// Create a new client pointing at the given server URL.
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Check the status code and decode the body as `T`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let (kind, message) = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => (err.kind, err.error),
                Err(_) => ("Http".to_string(), body),
            };
            return Err(ClientError::Rpc {
                status: status.as_u16(),
                kind,
                message,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ClientError> {
        let req = self.request(reqwest::Method::POST, path).json(body);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// GET /health
    pub async fn health(&self) -> Result<Value, ClientError> {
        let req = self.request(reqwest::Method::GET, "/health");
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// POST /can_compute
    pub async fn can_compute(&self, descriptor: &str) -> Result<bool, ClientError> {
        let resp: CanCompute = self
            .post("/can_compute", &json!({ "operation": descriptor }))
            .await?;
        Ok(resp.can_compute)
    }

    /// POST /compute; returns once outputs are in memory.
    pub async fn compute(&self, descriptor: &str) -> Result<(), ClientError> {
        let _: Value = self
            .post("/compute", &json!({ "operation": descriptor }))
            .await?;
        Ok(())
    }

    /// POST /get_scalar → the value as JSON text.
    pub async fn get_scalar(&self, guid: &Guid) -> Result<String, ClientError> {
        let resp: Scalar = self.post("/get_scalar", &json!({ "guid": guid })).await?;
        Ok(resp.scalar)
    }

    /// POST /has_in_sphynx_memory
    pub async fn has_in_memory(&self, guid: &Guid) -> Result<bool, ClientError> {
        let resp: InMemory = self
            .post("/has_in_sphynx_memory", &json!({ "guid": guid }))
            .await?;
        Ok(resp.has_in_memory)
    }

    /// POST /has_on_ordered_sphynx_disk
    pub async fn has_on_disk(&self, guid: &Guid) -> Result<bool, ClientError> {
        let resp: OnDisk = self
            .post("/has_on_ordered_sphynx_disk", &json!({ "guid": guid }))
            .await?;
        Ok(resp.has_on_disk)
    }

    /// POST /read_from_ordered_sphynx_disk
    pub async fn read_from_disk(&self, guid: &Guid) -> Result<(), ClientError> {
        let _: Value = self
            .post("/read_from_ordered_sphynx_disk", &json!({ "guid": guid }))
            .await?;
        Ok(())
    }
}
