//! Telemetry Relay
//!
//! Ingests client telemetry over HTTP and re-exposes it as Prometheus
//! instruments and structured logs.
//!
//! # Architecture Overview
//!
//! ```text
//!   Game client                         Relay
//!   ┌──────────────────────┐            ┌──────────────────────────────────────┐
//!   │ TelemetryClient      │   POST     │ http::server (CORS, metrics, limits) │
//!   │  identity + buffer   │──────────▶ │   → ingest::events / ingest::metrics │
//!   │  spans               │ X-Session  │   → observability (logs, spans,      │
//!   │  transport           │ X-Corr     │      Prometheus instruments)         │
//!   └──────────────────────┘            └──────────────────────────────────────┘
//!                                                        │ GET /metrics
//!                                                        ▼
//!                                                    Prometheus
//! ```

use clap::Parser;
use std::path::PathBuf;

use telemetry_relay::config::{load_config, RelayConfig};
use telemetry_relay::lifecycle::{self, shutdown_signal, Shutdown};
use telemetry_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "telemetry-relay")]
#[command(about = "Telemetry ingestion relay", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.service.name,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    if let Err(e) = lifecycle::start(config, &shutdown).await {
        tracing::error!(error = %e, "Relay failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
