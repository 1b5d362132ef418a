use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::DEFAULT_LOCALE;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Provider connection overrides. Credentials never live here,
/// they are read from process environment on first use.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderSettings {
    /// replaces the endpoint derived from PLAID_ENV
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}
