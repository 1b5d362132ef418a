use std::sync::Arc;

use anyhow::Result;
use clap::arg;
use clap::command;
use clap::Parser;
use stash_gateway::provider::{ClientRegistry, LinkTokenService};
use stash_gateway::resilience::retry::RetryPolicy;
use stash_gateway::server;
use stash_gateway::storage::InMemoryDatastore;
use stash_gateway::utils::{config_loader, logging};
use stash_gateway::utils::logging::LogLevel;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "stash-gateway.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // read .env, parse args
    // -------------------------------

    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    match dotenv {
        Ok(path) => info!("loaded .env from {}", path.display()),
        Err(e) => warn!("no .env loaded: {}", e),
    }

    // -------------------------------
    // 3. Prepare provider client registry
    //
    // credentials are resolved on first use
    // -------------------------------

    let registry = Arc::new(ClientRegistry::from_service_config(&service_config));
    let retry = RetryPolicy::from_config(&service_config.settings.retry)?;
    info!(
        "retry policy: {} attempts, worst case backoff {} ms",
        retry.max_attempts(),
        retry.max_delay_budget().as_millis()
    );

    // -------------------------------
    // 4. Prepare link token service
    // -------------------------------

    let datastore = Arc::new(InMemoryDatastore::new(service_config.storage.locale.clone()));
    let link_tokens = Arc::new(LinkTokenService::new(registry, datastore, retry));

    // -------------------------------
    // 5. Start http server
    // -------------------------------

    let shutdown = CancellationToken::new();
    let signal = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    info!("Service starting...");
    let served = server::server::start(&service_config.settings, link_tokens, shutdown.clone()).await;
    shutdown.cancel();
    signal.abort();
    served
}
