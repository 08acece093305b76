//! Nameserv RPC Server - JSON-RPC front end for the name server.
//!
//! This binary hosts one `RegistryService` behind a JSON-RPC 2.0 endpoint
//! and runs until interrupted or until a client calls `adminStop`.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use nameserv_core::{NameServerConfig, RegistryService, RpcConfig, ServiceRef};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "nameserv-rpc")]
#[command(about = "Hierarchical name server with leased bindings")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = RpcConfig::DEFAULT_PORT)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = RpcConfig::DEFAULT_HOST)]
    host: String,

    /// Maximum number of requests served concurrently
    #[arg(long, default_value_t = RpcConfig::DEFAULT_MAX_CLIENTS)]
    max_clients: usize,

    /// Never expire bindings (useful when debugging paused clients)
    #[arg(long)]
    no_lease: bool,

    /// Lease duration in seconds
    #[arg(long)]
    lease_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn service_config(&self) -> NameServerConfig {
        let config = NameServerConfig::default().with_no_lease(self.no_lease);
        match self.lease_secs {
            Some(secs) => config.with_lease_duration(Duration::from_secs(secs)),
            None => config,
        }
    }
}

fn log_filter(debug: bool) -> EnvFilter {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG takes precedence over --debug
    FmtSubscriber::builder()
        .with_env_filter(log_filter(args.debug))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting name server");

    let service = Arc::new(
        RegistryService::builder()
            .config(args.service_config())
            .build(),
    );
    let shutdown = Arc::new(Notify::new());

    let addr = server::start_server(
        Arc::clone(&service),
        Arc::clone(&shutdown),
        &args.host,
        args.port,
        args.max_clients,
    )
    .await?;

    service.initialize(ServiceRef::from(addr.to_string().as_str()))?;

    // Print port for launchers and tests to read (intentional stdout)
    println!("RPC_PORT={}", addr.port());

    info!(
        "Name server running on {} (cookie {})",
        addr,
        service.query_cookie()
    );

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        }
        _ = shutdown.notified() => {
            info!("Admin stop requested");
        }
    }

    // Stopping the reaper blocks for up to its join timeout
    let stopping = Arc::clone(&service);
    tokio::task::spawn_blocking(move || stopping.terminate()).await?;
    info!("Name server stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["nameserv-rpc"]);
        assert_eq!(args.port, RpcConfig::DEFAULT_PORT);
        assert_eq!(args.host, RpcConfig::DEFAULT_HOST);
        assert_eq!(args.max_clients, RpcConfig::DEFAULT_MAX_CLIENTS);
        assert_eq!(args.service_config(), NameServerConfig::default());
    }

    #[test]
    fn test_lease_flags() {
        let args = Args::parse_from(["nameserv-rpc", "--no-lease", "--lease-secs", "30"]);
        let config = args.service_config();
        assert!(config.no_lease);
        assert_eq!(config.lease_duration, Duration::from_secs(30));
    }

    #[test]
    fn test_log_filter_follows_debug_flag() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        use tracing::level_filters::LevelFilter;
        assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(false).max_level_hint(), Some(LevelFilter::INFO));
    }
}
