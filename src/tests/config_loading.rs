// YAML settings: loading, env expansion, defaults and aggregated validation.

#[cfg(test)]
mod test {

    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::config::loader::{expand_env_vars, parse_config};
    use crate::config::settings::{LogFormat, SettingsConfig};
    use crate::resilience::retry::{Backoff, RetryPolicy};
    use crate::utils::config_loader;
    use crate::utils::logging::{self, LogLevel};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_full_config_from_file() {
        let file = write_config(
            r#"
settings:
  http_timeout_ms: 2500
  retry:
    attempts: 3
    base_delay_ms: 200
    max_delay_ms: 1000
  metrics:
    path: /internal/metrics
    is_enabled: true
  server:
    host: 0.0.0.0
    port: "8080"
  logging:
    level: debug
    format: json
provider:
  base_url: http://127.0.0.1:9000
storage:
  locale: fr
"#,
        );

        let config = config_loader::run(file.path().to_str().unwrap()).await.unwrap();
        let settings = &config.settings;
        assert_eq!(settings.http_timeout_ms, 2500);
        assert_eq!(settings.retry.attempts, 3);
        assert!(settings.metrics.is_enabled);
        assert_eq!(settings.metrics.path, "/internal/metrics");
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, "8080");
        let logging = settings.logging.as_ref().unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(config.provider.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.storage.locale, "fr");

        let policy = RetryPolicy::from_config(&settings.retry).unwrap();
        assert_eq!(policy.max_attempts(), 3);
        assert!(matches!(policy.backoff(), Backoff::Exponential { .. }));
    }

    #[tokio::test]
    async fn empty_document_uses_defaults() {
        let config = parse_config("{}".to_owned()).await.unwrap();
        let settings = &config.settings;
        assert_eq!(settings.retry.attempts, 4);
        assert_eq!(settings.retry.base_delay_ms, 300);
        assert_eq!(settings.retry.max_delay_ms, 300);
        assert_eq!(settings.http_timeout_ms, 5000);
        assert!(!settings.metrics.is_enabled);
        assert_eq!(settings.server.port, "3000");
        assert_eq!(settings.logging.as_ref().unwrap().format, LogFormat::Compact);
        assert!(config.provider.base_url.is_none());
        assert_eq!(config.storage.locale, "en");
    }

    #[tokio::test]
    async fn file_without_settings_section_starts_with_defaults() {
        let file = write_config("storage:\n  locale: de\n");
        let config = config_loader::run(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(config.settings.http_timeout_ms, 5000);
        assert_eq!(config.settings.retry.attempts, 4);
        assert_eq!(config.storage.locale, "de");

        let settings = SettingsConfig::default();
        assert_eq!(settings.http_timeout_ms, 5000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(settings.logging.is_none());
    }

    #[tokio::test]
    async fn validation_reports_every_error() {
        let err = parse_config(
            r#"
settings:
  retry:
    attempts: 0
    base_delay_ms: 500
    max_delay_ms: 100
  server:
    port: "99999"
provider:
  base_url: ftp://example.com
"#
            .to_owned(),
        )
        .await
        .unwrap_err()
        .to_string();

        assert!(err.contains("total errors:4"), "{err}");
        assert!(err.contains("settings.retry.attempts must be > 0"));
        assert!(err.contains("settings.retry.max_delay_ms (100) must be >= base_delay_ms (500)"));
        assert!(err.contains("settings.server.port '99999'"));
        assert!(err.contains("unsupported scheme 'ftp'"));
    }

    #[tokio::test]
    async fn malformed_yaml_is_rejected() {
        assert!(parse_config("settings: [".to_owned()).await.is_err());
        assert!(parse_config("settings:\n  http_timeout_ms: soon\n".to_owned())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = config_loader::run("/nonexistent/stash-gateway.yaml")
            .await
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Invalid config format"), "{err}");
        assert!(err.contains("/nonexistent/stash-gateway.yaml"));
    }

    #[test]
    fn env_placeholders_are_expanded() {
        std::env::set_var("STASH_GATEWAY_TEST_PORT", "4100");
        std::env::remove_var("STASH_GATEWAY_TEST_UNSET");

        let expanded = expand_env_vars(
            "port: \"${STASH_GATEWAY_TEST_PORT:3000}\"\nhost: ${STASH_GATEWAY_TEST_UNSET:0.0.0.0}\nx: ${STASH_GATEWAY_TEST_UNSET}",
        )
        .unwrap();
        assert_eq!(expanded, "port: \"4100\"\nhost: 0.0.0.0\nx: ");

        std::env::remove_var("STASH_GATEWAY_TEST_PORT");
    }

    #[tokio::test]
    async fn cli_log_level_overrides_file() {
        let config = parse_config("settings:\n  logging:\n    level: warn\n    format: json\n".to_owned())
            .await
            .unwrap();

        let from_file = logging::resolve(&config, None);
        assert_eq!(from_file.level, "warn");

        let overridden = logging::resolve(&config, Some(LogLevel::DEBUG));
        assert_eq!(overridden.level, "debug");
        assert_eq!(overridden.format, LogFormat::Json);
    }
}
