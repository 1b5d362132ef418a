use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::utils::constants::{ENV_CLIENT_ID, ENV_ENVIRONMENT, ENV_SECRET, PROVIDER_API_VERSION};

/// ================================
/// Provider environments
/// ================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderEnvironment {
    Sandbox,
    Development,
    Production,
}

impl ProviderEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEnvironment::Sandbox => "sandbox",
            ProviderEnvironment::Development => "development",
            ProviderEnvironment::Production => "production",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            ProviderEnvironment::Sandbox => "https://sandbox.plaid.com",
            ProviderEnvironment::Development => "https://development.plaid.com",
            ProviderEnvironment::Production => "https://production.plaid.com",
        }
    }

    /// Sandbox is the designated test environment: no retries, no backoff.
    pub fn is_test(&self) -> bool {
        matches!(self, ProviderEnvironment::Sandbox)
    }
}

impl FromStr for ProviderEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sandbox" => Ok(ProviderEnvironment::Sandbox),
            "development" => Ok(ProviderEnvironment::Development),
            "production" => Ok(ProviderEnvironment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_owned())),
        }
    }
}

impl fmt::Display for ProviderEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("provider credentials not defined: {}", .0.join(", "))]
    MissingCredential(Vec<&'static str>),
    #[error("invalid environment value {0}")]
    UnknownEnvironment(String),
    #[error("cannot build http client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::MissingCredential(_) => "missing_credential",
            ConfigError::UnknownEnvironment(_) => "unknown_environment",
            ConfigError::HttpClient(_) => "http_client",
        }
    }
}

/// ================================
/// Resolved provider connection parameters
/// ================================
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub version: &'static str,
    pub environment: ProviderEnvironment,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("version", &self.version)
            .field("environment", &self.environment)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve from process environment.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve using the given variable lookup. Blank values count as absent.
    pub fn resolve_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let client_id = read(ENV_CLIENT_ID);
        let client_secret = read(ENV_SECRET);
        let environment = read(ENV_ENVIRONMENT);

        let missing: Vec<&'static str> = [
            (ENV_CLIENT_ID, client_id.is_none()),
            (ENV_SECRET, client_secret.is_none()),
            (ENV_ENVIRONMENT, environment.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (client_id, client_secret, environment) {
            (Some(client_id), Some(client_secret), Some(environment)) => {
                let environment: ProviderEnvironment = environment.trim().parse()?;
                Ok(Self {
                    base_url: environment.base_url().to_owned(),
                    client_id,
                    client_secret,
                    version: PROVIDER_API_VERSION,
                    environment,
                })
            }
            _ => Err(ConfigError::MissingCredential(missing)),
        }
    }

    /// Point the client at another endpoint (local mocks, proxies).
    /// The environment tag keeps driving retry policy selection.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}
