//! FleetBite API gateway.
//!
//! ```text
//!     Client ──▶ request id / trace / CORS
//!                   │
//!                   ▼
//!             ┌───────────┐   429
//!             │rate limit │──────▶
//!             └─────┬─────┘
//!                   ▼
//!             ┌───────────┐   404
//!             │route table│──────▶
//!             └─────┬─────┘
//!                   ▼
//!             ┌───────────┐   401
//!             │ auth gate │──────▶
//!             └─────┬─────┘
//!                   ▼
//!             ┌───────────┐   502/503/504
//!             │ forwarder │──────────────▶
//!             └─────┬─────┘
//!                   ▼
//!              upstream service
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use fleetbite_gateway::config::load_config;
use fleetbite_gateway::lifecycle::{wait_for_signal, Shutdown};
use fleetbite_gateway::observability::logging::init_logging;
use fleetbite_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "fleetbite-gateway", version, about = "FleetBite API gateway")]
struct Args {
    /// Optional TOML configuration file; `GW_*` variables override it.
    #[arg(short, long, env = "GW_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_logging(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "API gateway starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        services = config.services.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, rx).await?;

    tracing::info!("API gateway shutdown complete");
    Ok(())
}
