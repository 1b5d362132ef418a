use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::config::provider::{ConfigError, ProviderConfig, ProviderEnvironment};
use crate::observability::metrics::get_metrics;
use crate::provider::error::TransportError;
use crate::provider::types::{
    LinkTokenCreateRequest, LinkTokenCreateResponse, ProviderErrorBody,
};
use crate::resilience::retry::Attempt;
use crate::utils::constants::{
    HEADER_CLIENT_ID, HEADER_SECRET, HEADER_VERSION, LINK_TOKEN_CREATE_PATH,
};

static LINK_TOKEN_CREATE: &str = "link_token_create";

/// The long-lived provider handle: one resolved configuration, one connection pool.
#[derive(Debug)]
pub struct ProviderClient {
    http: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn environment(&self) -> ProviderEnvironment {
        self.config.environment
    }

    /// One `/link/token/create` call, classified for the retry executor.
    pub async fn link_token_create(
        &self,
        request: &LinkTokenCreateRequest,
    ) -> Attempt<LinkTokenCreateResponse, TransportError> {
        if request.country_codes.is_empty() || request.products.is_empty() {
            return Attempt::Terminal(TransportError::InvalidRequest(
                "country_codes and products must not be empty".to_owned(),
            ));
        }
        let result = self.post_json(LINK_TOKEN_CREATE, LINK_TOKEN_CREATE_PATH, request).await;
        Attempt::from_result(result, TransportError::disposition)
    }

    async fn post_json<Req, Resp>(
        &self,
        operation: &'static str,
        path: &str,
        body: &Req,
    ) -> Result<Resp, TransportError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let metrics = get_metrics().await;
        let start = Instant::now();
        metrics.provider_requests.with_label_values(&[operation]).inc();

        let result = self.send(path, body).await;

        metrics
            .provider_request_duration
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        if let Err(e) = &result {
            metrics
                .provider_failures
                .with_label_values(&[operation, e.reason()])
                .inc();
        }
        result
    }

    async fn send<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, TransportError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(HEADER_CLIENT_ID, &self.config.client_id)
            .header(HEADER_SECRET, &self.config.client_secret)
            .header(HEADER_VERSION, self.config.version)
            .json(body)
            .send()
            .await
            .map_err(TransportError::Network)?;

        let status = response.status();
        let text = response.text().await.map_err(TransportError::Network)?;

        if !status.is_success() {
            let body = serde_json::from_str::<ProviderErrorBody>(&text).unwrap_or_default();
            return Err(TransportError::Provider { status, body });
        }

        serde_json::from_str::<Resp>(&text)
            .map_err(|e| TransportError::Decode(format!("{e}; path: {path}")))
    }
}
