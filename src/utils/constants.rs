//! Shared constants and invariants

pub const APP_NAME: &str = "Stash";
pub const PROVIDER_API_VERSION: &str = "2020-09-14";

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_LOCALE: &str = "en";

// Retry defaults: one attempt plus three retries, fixed 300ms apart
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 4;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 300;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 300;

// Provider credentials, read from process environment
pub const ENV_CLIENT_ID: &str = "PLAID_CLIENT_ID";
pub const ENV_SECRET: &str = "PLAID_SECRET";
pub const ENV_ENVIRONMENT: &str = "PLAID_ENV";

// Provider request headers
pub const HEADER_CLIENT_ID: &str = "PLAID-CLIENT-ID";
pub const HEADER_SECRET: &str = "PLAID-SECRET";
pub const HEADER_VERSION: &str = "Plaid-Version";

pub const LINK_TOKEN_CREATE_PATH: &str = "/link/token/create";
