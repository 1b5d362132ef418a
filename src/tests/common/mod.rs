// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use serde_json::Value;

use crate::config::provider::{ProviderConfig, ProviderEnvironment};
use crate::provider::{ClientRegistry, LinkTokenService};
use crate::resilience::retry::{Backoff, RetryPolicy};
use crate::storage::InMemoryDatastore;
use crate::utils::constants::{
    ENV_CLIENT_ID, ENV_ENVIRONMENT, ENV_SECRET, LINK_TOKEN_CREATE_PATH, PROVIDER_API_VERSION,
};

pub const TEST_USER_ID: &str = "user-1";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Provider stand-in for `/link/token/create`: the first `failures` calls answer
/// with `failure_status`, later ones succeed. Returns the call counter.
pub async fn spawn_flaky_provider(
    failures: usize,
    failure_status: StatusCode,
) -> (JoinHandle<()>, String, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();
    let router = Router::new().route(
        LINK_TOKEN_CREATE_PATH,
        post(move |Json(_): Json<Value>| {
            let c = counter_clone.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    (failure_status, Json(provider_error_body()))
                } else {
                    (StatusCode::OK, Json(link_token_payload()))
                }
            }
        }),
    );
    let (handle, addr) = spawn_axum(router).await;
    (handle, format!("http://{}", addr), counter)
}

/// Accepts connections and closes them without answering. Returns the accept counter.
pub async fn spawn_hangup_listener() -> (JoinHandle<()>, String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let accepted = counter.clone();
    let handle = tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            accepted.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });
    (handle, format!("http://{}", addr), counter)
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn link_token_payload() -> Value {
    json!({
        "link_token": "link-sandbox-af1a0311-da53-4636-b754-dd15cc058176",
        "expiration": "2026-10-19T12:00:00Z",
        "request_id": "XQVgFigpGHXkb0b",
    })
}

pub fn provider_error_body() -> Value {
    json!({
        "error_type": "API_ERROR",
        "error_code": "INTERNAL_SERVER_ERROR",
        "error_message": "an unexpected error occurred",
        "display_message": null,
        "request_id": "Hs8Kj2Lm"
    })
}

pub fn provider_config(environment: ProviderEnvironment) -> ProviderConfig {
    ProviderConfig {
        base_url: environment.base_url().to_owned(),
        client_id: "test_id".to_owned(),
        client_secret: "test_secret".to_owned(),
        version: PROVIDER_API_VERSION,
        environment,
    }
}

/// Registry with fixed credentials pointed at `base_url`.
pub fn registry_for(base_url: &str, environment: ProviderEnvironment) -> Arc<ClientRegistry> {
    Arc::new(ClientRegistry::with_resolver(
        move || Ok(provider_config(environment)),
        Some(base_url.to_owned()),
        Duration::from_secs(5),
    ))
}

pub fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Backoff::Fixed(Duration::from_millis(10))).unwrap()
}

pub fn link_token_service(registry: Arc<ClientRegistry>, retry: RetryPolicy) -> LinkTokenService {
    let datastore = Arc::new(InMemoryDatastore::new("en").with_user_id(TEST_USER_ID));
    LinkTokenService::new(registry, datastore, retry)
}

/// Snapshot of the provider env vars, restored on drop.
/// Tests that use it must be `#[serial]`.
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    pub fn new() -> Self {
        let saved = [ENV_CLIENT_ID, ENV_SECRET, ENV_ENVIRONMENT]
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect();
        Self { saved }
    }

    pub fn set(&self, name: &str, value: &str) -> &Self {
        std::env::set_var(name, value);
        self
    }

    pub fn remove(&self, name: &str) -> &Self {
        std::env::remove_var(name);
        self
    }

    /// All three credentials present.
    pub fn valid(&self, environment: &str) -> &Self {
        self.set(ENV_CLIENT_ID, "test_id")
            .set(ENV_SECRET, "test_secret")
            .set(ENV_ENVIRONMENT, environment)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }
}

pub fn build_reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
