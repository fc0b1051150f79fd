use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shortlink_core::MappingRepository;
use shortlink_gateway::cli::{Cli, StorageBackendArg};
use shortlink_gateway::{telemetry, App, AppState};
use shortlink_generator::RandomGenerator;
use shortlink_shortener::ShortenerService;
use shortlink_storage::{InMemoryRepository, RedisRepository};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format)?;

    match cli.storage {
        StorageBackendArg::Redis => {
            let repository = RedisRepository::connect(&cli.redis_url, cli.redis_pool_size)
                .context("failed to build redis pool")?;
            if let Err(e) = repository.ping().await {
                // the pool reconnects lazily, so serve anyway and let /health report it
                warn!(error = %e, "Redis is not reachable at startup");
            }
            run_server(&cli, repository).await
        }
        StorageBackendArg::InMemory => run_server(&cli, InMemoryRepository::new()).await,
    }
}

async fn run_server<R: MappingRepository>(cli: &Cli, repository: R) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cli.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr()))?;
    let local_addr = listener.local_addr()?;

    let shortener = ShortenerService::new(repository, RandomGenerator::new());
    let state = AppState::new(
        Arc::new(shortener),
        cli.base_url(),
        cli.environment,
        local_addr.port(),
    );
    info!(
        listen_addr = %local_addr,
        base_url = %state.base_url(),
        environment = %cli.environment,
        storage = %cli.storage,
        "Starting ShortLink gateway"
    );

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
