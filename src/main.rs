use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use rewards_api::config::ApiConfig;
use rewards_api::rpc::ChainRpcClient;
use rewards_api::state::AppState;
use rewards_api::{http, storage};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ApiConfig::load().context("Failed to load configuration")?;

    let store = storage::connect(&config.database)
        .await
        .context("Failed to initialize storage backend")?;

    let gateway = ChainRpcClient::new(config.chain.clone())
        .context("Failed to initialize contract gateway")?;
    info!(
        "Contract gateway targets {} (timeout {:?})",
        config.chain.rpc_url,
        gateway.timeout()
    );

    let app_state = AppState::new(store, Arc::new(gateway));

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("Rewards API listening on {local_addr}");

    let router: Router = http::router(app_state);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}

fn init_tracing() {
    let default_filter = "info";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    assert!(!filter.is_empty(), "Tracing filter must not be empty");
    assert!(filter.len() < 256, "Tracing filter length exceeds bounds");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
