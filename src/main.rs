//! # Point server
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the in-memory stores
//! - Create the point service
//! - Start the HTTP server

mod config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use point_service::{
    adapters::memory::{MemoryBalanceStore, MemoryLedgerStore},
    inbound::HttpServer,
    PointService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,point_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Starting point server on port {}", config.port);
    if !config.store_latency.is_zero() {
        tracing::info!("Simulating {:?} of store latency", config.store_latency);
    }

    let service = PointService::new(
        MemoryBalanceStore::with_latency(config.store_latency),
        MemoryLedgerStore::with_latency(config.store_latency),
    );

    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
