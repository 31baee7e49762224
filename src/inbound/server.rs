//! HTTP Server configuration and startup.

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::{
    commands::PointService,
    ports::{balance::BalanceStorePort, ledger::LedgerStorePort},
};

/// HTTP Server for the point API.
pub struct HttpServer<B, L> {
    service: PointService<B, L>,
}

impl<B, L> HttpServer<B, L>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    pub fn new(service: PointService<B, L>) -> Self {
        Self { service }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/point/{id}", get(handlers::get_balance::<B, L>))
            .route("/point/{id}/histories", get(handlers::get_history::<B, L>))
            .route("/point/{id}/charge", patch(handlers::charge::<B, L>))
            .route("/point/{id}/use", patch(handlers::use_points::<B, L>))
            .layer(TraceLayer::new_for_http())
            .with_state(self.service.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
