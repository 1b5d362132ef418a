use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::provider::ConfigError;
use crate::observability::metrics::get_metrics;
use crate::provider::registry::ClientRegistry;
use crate::provider::types::{
    CountryCode, LinkTokenCreateRequest, LinkTokenCreateResponse, LinkTokenUser, Product,
};
use crate::resilience::retry::{RetryError, RetryPolicy};
use crate::storage::Datastore;
use crate::utils::constants::APP_NAME;

static LINK_TOKEN_CREATE: &str = "link_token_create";

/// What callers get to see. Provider detail stays in the logs.
#[derive(Debug, Error)]
pub enum LinkTokenError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("link token service unavailable")]
    Unavailable,
    #[error("link token request cancelled")]
    Cancelled,
}

impl LinkTokenError {
    fn kind(&self) -> &'static str {
        match self {
            LinkTokenError::Config(_) => "config",
            LinkTokenError::Unavailable => "unavailable",
            LinkTokenError::Cancelled => "cancelled",
        }
    }
}

pub struct LinkTokenService {
    registry: Arc<ClientRegistry>,
    datastore: Arc<dyn Datastore>,
    retry: RetryPolicy,
}

impl LinkTokenService {
    pub fn new(
        registry: Arc<ClientRegistry>,
        datastore: Arc<dyn Datastore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            datastore,
            retry,
        }
    }

    /// Mint a link token for the local user.
    ///
    /// Inputs are expected to be validated already: non-empty and canonical.
    /// Every call may mint a fresh token at the provider.
    pub async fn create_link_token(
        &self,
        country_codes: &[CountryCode],
        products: &[Product],
        cancel: &CancellationToken,
    ) -> Result<LinkTokenCreateResponse, LinkTokenError> {
        let result = self.issue(country_codes, products, cancel).await;

        let metrics = get_metrics().await;
        match &result {
            Ok(response) => {
                metrics.link_tokens_issued.inc();
                match response.expires_at() {
                    Some(at) => info!(
                        "link token issued, request_id: {}, expires at {}",
                        response.request_id,
                        at.to_rfc3339()
                    ),
                    None => warn!(
                        "link token issued, request_id: {}, unrecognized expiration '{}'",
                        response.request_id, response.expiration
                    ),
                }
            }
            Err(e) => {
                metrics.link_token_failures.with_label_values(&[e.kind()]).inc();
            }
        }
        result
    }

    async fn issue(
        &self,
        country_codes: &[CountryCode],
        products: &[Product],
        cancel: &CancellationToken,
    ) -> Result<LinkTokenCreateResponse, LinkTokenError> {
        let client = self.registry.get().await?;

        let request = LinkTokenCreateRequest {
            client_name: APP_NAME.to_owned(),
            language: self.datastore.locale(),
            country_codes: country_codes.to_vec(),
            user: LinkTokenUser {
                client_user_id: self.datastore.user_id(),
            },
            products: products.to_vec(),
        };

        let policy = RetryPolicy::for_environment(client.environment(), &self.retry);
        let mut attempts: u32 = 0;
        let result = policy
            .execute(
                || {
                    attempts += 1;
                    client.link_token_create(&request)
                },
                cancel,
            )
            .await;

        if attempts > 1 {
            get_metrics()
                .await
                .provider_retries
                .with_label_values(&[LINK_TOKEN_CREATE])
                .inc_by(u64::from(attempts - 1));
        }

        result.map_err(|e| match e {
            RetryError::Cancelled { attempts } => {
                info!("link token request cancelled after {} attempts", attempts);
                LinkTokenError::Cancelled
            }
            e => {
                info!("link token request failed: {}", e);
                LinkTokenError::Unavailable
            }
        })
    }
}
