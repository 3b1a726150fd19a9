//! Client tests against a real server bound to an ephemeral port.

#![allow(clippy::unwrap_used, clippy::panic)]

use sphynx::api::{AppState, ENV_API_KEY, create_router};
use sphynx::persist::Persister;
use sphynx_client::{ClientError, SphynxClient};
use sphynx_core::{Engine, EntityStore, Guid, OperationDescriptor, OperationRegistry, OperationsConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

/// Serializes router construction, which reads `SPHYNX_API_KEY`.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Start a server; returns its base URL. The temp dir must outlive it.
async fn spawn_server(api_key: Option<&str>) -> (String, TempDir) {
    let temp = tempdir().unwrap();
    let store = Arc::new(
        EntityStore::open(temp.path().join("ordered"), temp.path().join("unordered")).unwrap(),
    );
    let registry = OperationRegistry::standard(&OperationsConfig::default()).unwrap();
    let engine = Arc::new(Engine::new(Arc::clone(&store), registry));
    let (persister, _workers) = Persister::spawn(store, 2, 16);

    let router = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: Router construction is serialized by ENV_MUTEX.
        unsafe {
            match api_key {
                Some(key) => std::env::set_var(ENV_API_KEY, key),
                None => std::env::remove_var(ENV_API_KEY),
            }
        };
        let router = create_router(AppState::new(engine, persister));
        // SAFETY: as above.
        unsafe { std::env::remove_var(ENV_API_KEY) };
        router
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), temp)
}

fn example_graph() -> String {
    OperationDescriptor::new("ExampleGraph")
        .output("vertices", "vs")
        .output("greeting", "greeting")
        .to_json()
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (url, _temp) = spawn_server(None).await;
    let client = SphynxClient::new(&url, None);

    let health = client.health().await.unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_compute_round_trip() {
    let (url, _temp) = spawn_server(None).await;
    let client = SphynxClient::new(&format!("{url}/"), None);

    assert!(client.can_compute(&example_graph()).await.unwrap());
    client.compute(&example_graph()).await.unwrap();

    assert!(client.has_in_memory(&Guid::new("vs")).await.unwrap());
    assert_eq!(
        client.get_scalar(&Guid::new("greeting")).await.unwrap(),
        "\"Hello world! 😀 \""
    );

    let mut on_disk = false;
    for _ in 0..200 {
        if client.has_on_disk(&Guid::new("vs")).await.unwrap() {
            on_disk = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(on_disk);
    client.read_from_disk(&Guid::new("vs")).await.unwrap();
}

#[tokio::test]
async fn test_rpc_error_carries_kind() {
    let (url, _temp) = spawn_server(None).await;
    let client = SphynxClient::new(&url, None);

    match client.get_scalar(&Guid::new("missing")).await {
        Err(ClientError::Rpc { status, kind, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(kind, "EntityNotFound");
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_without_key() {
    let (url, _temp) = spawn_server(Some("s3cret")).await;

    let anonymous = SphynxClient::new(&url, None);
    assert!(matches!(
        anonymous.has_in_memory(&Guid::new("x")).await,
        Err(ClientError::Unauthorized)
    ));
    anonymous.health().await.unwrap();

    let authorized = SphynxClient::new(&url, Some("s3cret".to_string()));
    assert!(!authorized.has_in_memory(&Guid::new("x")).await.unwrap());
}

#[tokio::test]
async fn test_connection_failure() {
    // Reserve a port, then free it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SphynxClient::new(&format!("http://{addr}"), None);
    assert!(matches!(
        client.health().await,
        Err(ClientError::ConnectionFailed(_))
    ));
}
