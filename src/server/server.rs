use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::provider::link_token::LinkTokenService;
use crate::server::routes::{create_user_token, health};

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub link_tokens: Arc<LinkTokenService>,
    /// cancelled on shutdown; in-flight provider calls stop at their next await
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        metrics: &Metrics,
        link_tokens: Arc<LinkTokenService>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            link_tokens,
            shutdown,
        }
    }
}

pub fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/account/create_user_token", post(create_user_token))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Start the Axum server and serve until the shutdown token is cancelled.
pub async fn start(
    settings_config: &SettingsConfig,
    link_tokens: Arc<LinkTokenService>,
    shutdown: CancellationToken,
) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, link_tokens, shutdown.clone());
    let app = router(settings_config, state);

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port))
        .await
        .with_context(|| format!("cannot bind {}:{}", bind_addr, port))?;
    info!("address: {}, port: {}", bind_addr, port);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("http server failed")?;
    metrics.up.set(0);

    info!("http server stopped");
    Ok(())
}
