//! # Stash Gateway Library
//!
//! Mediates access to the Plaid API on behalf of the backend:
//! lazily resolved and validated credentials, one shared provider client,
//! and link-token issuance behind a retry executor that tells transient
//! transport failures apart from terminal ones.
//!
//! Modules:
//! - `config`: provider credentials resolution and service settings
//! - `resilience`: retry policy and executor
//! - `provider`: provider client, client registry, link-token issuance
//! - `storage`: local user identity and locale
//! - `observability`: prometheus metrics and the metrics route
//! - `server`: HTTP routes and request validation

pub mod config;
pub mod resilience;
pub mod provider;
pub mod storage;
pub mod observability;
pub mod server;
pub mod utils;
pub mod tests;


pub use crate::config::provider::{ConfigError, ProviderConfig, ProviderEnvironment};
pub use crate::config::types::ServiceConfig;
pub use crate::provider::{ClientRegistry, LinkTokenError, LinkTokenService};
pub use crate::resilience::retry::{Attempt, Backoff, Disposition, RetryError, RetryPolicy};
