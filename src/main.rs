//! Instrumented API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum router ──▶ instrumentation ──▶ handler
//!                        │                 │
//!                        │                 ├──▶ tracing (one line per request)
//!                        │                 └──▶ histograms ──▶ Prometheus scrape
//!     Client Response    │
//!     ◀──────────────────┘  (buffered response)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_instrumentation::config::{load_config, ServiceConfig};
use api_instrumentation::observability::init_logging;
use api_instrumentation::{HttpMetrics, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "api-instrumentation", version, about = "Instrumented API server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    init_logging(&config.observability)?;

    tracing::info!("api-instrumentation v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    // Histograms are registered exactly once, here.
    let metrics = if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        let (metrics, exporter) =
            HttpMetrics::with_http_listener(&config.observability.metrics, addr)?;
        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                tracing::error!(error = ?e, "Metrics exporter stopped");
            }
        });
        tracing::info!(address = %addr, "Metrics exporter listening");
        metrics
    } else {
        HttpMetrics::prometheus(&config.observability.metrics)?.0
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, metrics);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
