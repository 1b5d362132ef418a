//! Provider (Plaid) access: wire types, the shared client and link-token issuance.

pub mod client;
pub mod error;
pub mod link_token;
pub mod registry;
pub mod types;

pub use client::ProviderClient;
pub use error::TransportError;
pub use link_token::{LinkTokenError, LinkTokenService};
pub use registry::ClientRegistry;
pub use types::{CountryCode, LinkTokenCreateRequest, LinkTokenCreateResponse, Product};
