//! HTTP server implementation using Axum.

use crate::handlers::{handle_health, handle_rpc};
use axum::{
    routing::{get, post},
    Router,
};
use nameserv_core::RegistryService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    /// The name server itself
    pub service: Arc<RegistryService>,
    /// Signalled by `adminStop`; the main task waits on it
    pub shutdown: Arc<Notify>,
}

pub fn router(state: Arc<AppState>, max_clients: usize) -> Router {
    // Configure CORS for browser-based tooling
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/rpc", post(handle_rpc))
        .layer(ConcurrencyLimitLayer::new(max_clients.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the JSON-RPC HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    service: Arc<RegistryService>,
    shutdown: Arc<Notify>,
    host: &str,
    port: u16,
    max_clients: usize,
) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState { service, shutdown });
    let app = router(state, max_clients);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Bind to the address
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(
        "Server listening on {} (max {} concurrent clients)",
        actual_addr, max_clients
    );

    // Spawn the server in the background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_starts() {
        let service = Arc::new(RegistryService::new());
        let addr = start_server(service, Arc::new(Notify::new()), "127.0.0.1", 0, 4)
            .await
            .unwrap();
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn test_bad_host_is_rejected() {
        let service = Arc::new(RegistryService::new());
        let result = start_server(service, Arc::new(Notify::new()), "not a host", 0, 4).await;
        assert!(result.is_err());
    }
}
