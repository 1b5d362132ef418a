use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::types::ProviderErrorBody;
use crate::resilience::retry::Disposition;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),
    #[error("provider responded {status}: {body}")]
    Provider {
        status: StatusCode,
        body: ProviderErrorBody,
    },
    #[error("cannot decode provider response: {0}")]
    Decode(String),
    #[error("request rejected before sending: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Transient failures are worth another attempt, everything else is final.
    pub fn disposition(&self) -> Disposition {
        match self {
            TransportError::Network(e) if e.is_builder() => Disposition::Terminal,
            TransportError::Network(_) => Disposition::Retriable,
            TransportError::Provider { status, .. }
                if status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS =>
            {
                Disposition::Retriable
            }
            TransportError::Provider { .. } => Disposition::Terminal,
            TransportError::Decode(_) | TransportError::InvalidRequest(_) => Disposition::Terminal,
        }
    }

    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            TransportError::Network(e) if e.is_timeout() => "timeout",
            TransportError::Network(_) => "network",
            TransportError::Provider { status, .. } if status.is_server_error() => "provider_5xx",
            TransportError::Provider { .. } => "provider_4xx",
            TransportError::Decode(_) => "decode",
            TransportError::InvalidRequest(_) => "invalid_request",
        }
    }
}
