use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-supported country codes, canonical upper-case spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryCode {
    Us,
    Gb,
    Es,
    Nl,
    Fr,
    Ie,
    Ca,
    De,
    It,
    Pl,
    Dk,
    No,
    Se,
    Ee,
    Lt,
    Lv,
    Pt,
    Be,
    At,
    Fi,
}

impl CountryCode {
    pub const ALL: [CountryCode; 20] = [
        CountryCode::Us,
        CountryCode::Gb,
        CountryCode::Es,
        CountryCode::Nl,
        CountryCode::Fr,
        CountryCode::Ie,
        CountryCode::Ca,
        CountryCode::De,
        CountryCode::It,
        CountryCode::Pl,
        CountryCode::Dk,
        CountryCode::No,
        CountryCode::Se,
        CountryCode::Ee,
        CountryCode::Lt,
        CountryCode::Lv,
        CountryCode::Pt,
        CountryCode::Be,
        CountryCode::At,
        CountryCode::Fi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CountryCode::Us => "US",
            CountryCode::Gb => "GB",
            CountryCode::Es => "ES",
            CountryCode::Nl => "NL",
            CountryCode::Fr => "FR",
            CountryCode::Ie => "IE",
            CountryCode::Ca => "CA",
            CountryCode::De => "DE",
            CountryCode::It => "IT",
            CountryCode::Pl => "PL",
            CountryCode::Dk => "DK",
            CountryCode::No => "NO",
            CountryCode::Se => "SE",
            CountryCode::Ee => "EE",
            CountryCode::Lt => "LT",
            CountryCode::Lv => "LV",
            CountryCode::Pt => "PT",
            CountryCode::Be => "BE",
            CountryCode::At => "AT",
            CountryCode::Fi => "FI",
        }
    }
}

impl FromStr for CountryCode {
    type Err = UnknownValue;

    /// Exact match on the canonical spelling; case folding is the caller's job.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CountryCode::ALL
            .into_iter()
            .find(|code| code.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_owned()))
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider products a link token can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Assets,
    Auth,
    Balance,
    Identity,
    IdentityVerification,
    Investments,
    Liabilities,
    PaymentInitiation,
    Transactions,
    Income,
    IncomeVerification,
    Employment,
    RecurringTransactions,
    Transfer,
    Signal,
    Statements,
}

impl Product {
    pub const ALL: [Product; 16] = [
        Product::Assets,
        Product::Auth,
        Product::Balance,
        Product::Identity,
        Product::IdentityVerification,
        Product::Investments,
        Product::Liabilities,
        Product::PaymentInitiation,
        Product::Transactions,
        Product::Income,
        Product::IncomeVerification,
        Product::Employment,
        Product::RecurringTransactions,
        Product::Transfer,
        Product::Signal,
        Product::Statements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Assets => "assets",
            Product::Auth => "auth",
            Product::Balance => "balance",
            Product::Identity => "identity",
            Product::IdentityVerification => "identity_verification",
            Product::Investments => "investments",
            Product::Liabilities => "liabilities",
            Product::PaymentInitiation => "payment_initiation",
            Product::Transactions => "transactions",
            Product::Income => "income",
            Product::IncomeVerification => "income_verification",
            Product::Employment => "employment",
            Product::RecurringTransactions => "recurring_transactions",
            Product::Transfer => "transfer",
            Product::Signal => "signal",
            Product::Statements => "statements",
        }
    }
}

impl FromStr for Product {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Product::ALL
            .into_iter()
            .find(|product| product.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_owned()))
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownValue(pub String);

/// ================================
/// /link/token/create
/// ================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTokenCreateRequest {
    pub client_name: String,
    pub language: String,
    pub country_codes: Vec<CountryCode>,
    pub user: LinkTokenUser,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTokenUser {
    pub client_user_id: String,
}

/// Successful provider payload. Fields we do not model are kept as-is,
/// `expiration` included: it goes back to callers exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTokenCreateResponse {
    pub link_token: String,
    pub expiration: String,
    pub request_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LinkTokenCreateResponse {
    /// `None` when the provider sent something other than RFC 3339.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expiration)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Error body the provider attaches to non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorBody {
    pub error_type: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub display_message: Option<String>,
    pub request_id: Option<String>,
}

impl fmt::Display for ProviderErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}: {}",
            self.error_type.as_deref().unwrap_or("UNKNOWN"),
            self.error_code.as_deref().unwrap_or("UNKNOWN"),
            self.error_message.as_deref().unwrap_or("")
        )
    }
}
