use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Provider transport metrics
    pub provider_requests: IntCounterVec,
    pub provider_failures: IntCounterVec,
    pub provider_request_duration: HistogramVec,
    pub provider_retries: IntCounterVec,

    // Link token metrics
    pub link_tokens_issued: IntCounter,
    pub link_token_failures: IntCounterVec,

    // Config/runtime
    pub config_parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub provider_config_errors: IntCounterVec,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("stashgateway".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Provider
            provider_requests: IntCounterVec::new(Opts::new("provider_requests_total","Total provider call attempts by operation",),&["operation"],).unwrap(),
            provider_failures: IntCounterVec::new(Opts::new("provider_failures_total", "Provider call failures by reason"),&["operation", "reason"],).unwrap(),
            provider_request_duration: HistogramVec::new(HistogramOpts::new("provider_request_duration_seconds", "Provider call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["operation"],).unwrap(),
            provider_retries: IntCounterVec::new(Opts::new("provider_retries_total", "Attempts beyond the first one"),&["operation"],).unwrap(),

            // Link token
            link_tokens_issued: IntCounter::new("link_tokens_issued_total","Link tokens handed out to callers",).unwrap(),
            link_token_failures: IntCounterVec::new(Opts::new("link_token_failures_total", "Link token requests that ended in failure"),&["kind"],).unwrap(),

            // Config/runtime
            config_parse_failures: IntCounter::new("config_parse_failures_total","Settings file parse failures",).unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            provider_config_errors: IntCounterVec::new(Opts::new("provider_config_errors_total", "Provider configuration resolution failures"),&["kind"],).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.provider_requests.clone())).unwrap();
        reg.register(Box::new(metrics.provider_failures.clone())).unwrap();
        reg.register(Box::new(metrics.provider_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.provider_retries.clone())).unwrap();
        reg.register(Box::new(metrics.link_tokens_issued.clone())).unwrap();
        reg.register(Box::new(metrics.link_token_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.provider_config_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
