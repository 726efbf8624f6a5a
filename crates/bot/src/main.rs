//! Cross-DEX flash-loan arbitrage bot
//!
//! Polls two venue price sources on a fixed cadence and fires a flash swap
//! when venue A trades below venue B.

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arb_core::Config;
use arb_detector::OpportunityDetector;
use arb_executor::{FlashSwapClient, StatusTracker};
use arb_price_feed::{PairPriceFeed, PoolPriceFeed, SubgraphClient};

mod runner;

use runner::CycleRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("starting arb-bot v{}", env!("CARGO_PKG_VERSION"));

    // Configuration is fatal at startup and immutable afterwards
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "missing or invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        rpc_url = %config.rpc_url,
        contract = %config.contract_address,
        pool_a = %config.pool_a_id(),
        pair_b = %config.pair_b_id(),
        interval_secs = config.poll_interval.as_secs(),
        "configuration loaded"
    );

    let http = reqwest::Client::new();

    let venue_a = PoolPriceFeed::new(
        SubgraphClient::new(http.clone(), config.pool_a_subgraph_url.clone())
            .with_api_key(config.graph_api_key.clone()),
        &config.pool_a_id(),
        config.base_token,
        config.quote_token,
    );

    let venue_b = PairPriceFeed::new(
        SubgraphClient::new(http.clone(), config.pair_b_subgraph_url.clone())
            .with_api_key(config.graph_api_key.clone()),
        &config.pair_b_id(),
        config.base_token,
        config.quote_token,
    );

    let executor = FlashSwapClient::connect(
        &config.rpc_url,
        &config.private_key,
        config.contract_address,
    )?;

    let tracker = StatusTracker::new(
        http,
        config.explorer_api_url.clone(),
        config.explorer_api_key.clone(),
    );

    let runner = CycleRunner::new(
        Arc::new(venue_a),
        Arc::new(venue_b),
        OpportunityDetector::new(),
        Arc::new(executor),
        Arc::new(tracker),
        config.pool_a,
        config.poll_interval,
    );

    // Shutdown channel, observed between cycles
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C");
            }
            _ = terminate => {
                info!("Received termination signal");
            }
        }

        let _ = shutdown_tx.send(());
    });

    runner.run(shutdown_rx).await;

    info!("arbitrage loop stopped");
    Ok(())
}
