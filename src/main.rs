//! Site server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http server ──┬── /api/... ──▶ API router ──▶ ApiHandler ─┐
//!                      (request id,  │                                           │
//!                       trace,       └── other ─────▶ page router ─▶ Page ───────┤
//!                       limits)                                                  │
//!                                           Data (read-only) ◀───────────────────┤
//!     Client Response                                                            │
//!     ◀──────────────────────────────────────────────────────────────────────────┘
//!
//!     Startup: config → init functions (write DataStore) → frozen routers → listener
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_router::lifecycle::signals::wait_for_signal;
use site_router::lifecycle::startup::{build_site, load_or_default, log_config};
use site_router::observability::{logging, metrics};
use site_router::{demo, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "site-server")]
#[command(about = "Serve the demo site", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("site-server v{} starting", env!("CARGO_PKG_VERSION"));
    log_config(&config, args.config.as_deref());

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let site = build_site(demo::site()?, &config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, site).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
