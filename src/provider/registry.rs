use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::provider::{ConfigError, ProviderConfig};
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::provider::client::ProviderClient;

type Resolver = dyn Fn() -> Result<ProviderConfig, ConfigError> + Send + Sync;

/// Owns the process-wide provider client.
///
/// The client is built lazily on the first `get()`. A failed resolution is not
/// cached, so fixing the environment lets the next call succeed. Once built,
/// every caller shares the same `Arc` until the registry is dropped.
pub struct ClientRegistry {
    resolver: Box<Resolver>,
    base_url: Option<String>,
    timeout: Duration,
    client: RwLock<Option<Arc<ProviderClient>>>,
}

impl ClientRegistry {
    /// Registry reading credentials from process environment.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        Self::with_resolver(ProviderConfig::resolve, base_url, timeout)
    }

    pub fn from_service_config(service_config: &ServiceConfig) -> Self {
        Self::new(
            service_config.provider.base_url.clone(),
            Duration::from_millis(service_config.settings.http_timeout_ms),
        )
    }

    pub fn with_resolver<R>(resolver: R, base_url: Option<String>, timeout: Duration) -> Self
    where
        R: Fn() -> Result<ProviderConfig, ConfigError> + Send + Sync + 'static,
    {
        Self {
            resolver: Box::new(resolver),
            base_url,
            timeout,
            client: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Result<Arc<ProviderClient>, ConfigError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(Arc::clone(client));
        }

        let mut slot = self.client.write().await;
        // another caller may have won the race while we waited for the lock
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(self.build().await?);
        *slot = Some(Arc::clone(&client));
        info!(
            "provider client successfully started, environment: {}",
            client.environment()
        );
        Ok(client)
    }

    async fn build(&self) -> Result<ProviderClient, ConfigError> {
        let resolved = (self.resolver)().and_then(|config| {
            let config = match &self.base_url {
                Some(base_url) => config.with_base_url(base_url.as_str()),
                None => config,
            };
            ProviderClient::new(config, self.timeout)
        });
        if let Err(e) = &resolved {
            error!("provider client setup failed: {}", e);
            get_metrics()
                .await
                .provider_config_errors
                .with_label_values(&[e.kind()])
                .inc();
        }
        resolved
    }

    pub async fn is_initialized(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Drop the cached client, as if the process had restarted.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn reset(&self) {
        self.client.write().await.take();
    }
}
