//! Service settings validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates retry, server, metrics, logging and provider invariants

use tracing::{error, info};
use url::Url;

use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::config::types::{ProviderSettings, ServiceConfig, StorageSettings};
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_provider(&cfg.provider, &mut errors);
    validate_storage(&cfg.storage, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    validate_retry("settings.retry", &settings.retry, errors);

    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if settings.http_timeout_ms == 0 {
        errors.push("settings.http_timeout_ms must be > 0".to_string());
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == 0 {
        errors.push(format!("{}.attempts must be > 0", path));
    }
    if retry.max_delay_ms < retry.base_delay_ms {
        errors.push(format!(
            "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
            path, retry.max_delay_ms, retry.base_delay_ms
        ));
    }
}

fn validate_provider(provider: &ProviderSettings, errors: &mut Vec<String>) {
    let Some(base_url) = &provider.base_url else {
        return;
    };
    match Url::parse(base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "provider.base_url '{}' has unsupported scheme '{}'",
            base_url,
            url.scheme()
        )),
        Err(e) => errors.push(format!("provider.base_url '{}' is invalid: {}", base_url, e)),
    }
}

fn validate_storage(storage: &StorageSettings, errors: &mut Vec<String>) {
    if storage.locale.trim().is_empty() {
        errors.push("storage.locale must not be empty".to_string());
    }
}
