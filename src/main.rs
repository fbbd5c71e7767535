//! Spot price router (v1)
//!
//! An HTTP service answering spot-price queries for trading pairs from
//! several exchange APIs, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ http server ──▶ router ──▶ interceptors (cache, log) pre
//!                   (timeout,                      │
//!                    request id,                   ▼
//!                    trace)                   route table
//!                                    ping │ race │ all │ direct
//!                                              │
//!                                              ▼
//!                                    providers (gdax, bitfinex)
//!                                              │
//!   Client Response                            ▼
//!   ◀────────────── http server ◀── router ◀── interceptors post
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use spot_router::config::resolve_config;
use spot_router::http::HttpServer;
use spot_router::lifecycle::shutdown_signal;
use spot_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "spot-router")]
#[command(about = "HTTP router for exchange spot prices", long_about = None)]
struct Args {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(args.config.as_deref(), args.bind)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("spot-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_ms = config.timeouts.upstream_ms,
        combinator_timeout_ms = config.timeouts.combinator_ms,
        cache_enabled = config.cache.enabled,
        strict_validation = config.routing.strict_validation,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
