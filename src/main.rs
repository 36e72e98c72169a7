//! E-commerce demo service (v1)
//!
//! Product listing, checkout and order listing over HTTP, backed by SQLite,
//! with per-request structured logs, Prometheus metrics and request spans.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ pipeline ──▶ route table ──▶ handler ──▶ store gateway ──▶ SQLite
//!                     (id, timer)                    │
//!     Client Response                                │
//!     ◀────────────── pipeline ◀─────────────────────┘
//!                     (metrics, access log)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ecommerce_service::config::{default_config, load_config};
use ecommerce_service::observability::tracing::otlp_provider;
use ecommerce_service::observability::{logging, ExporterEndpoint};
use ecommerce_service::{HttpServer, MetricsRecorder, Shutdown, Store};

#[derive(Parser)]
#[command(name = "ecommerce-service")]
#[command(about = "Observable e-commerce demo service", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override database.path.
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };
    config.apply_overrides(args.bind, args.database)?;

    // The OTLP client blocks; build it and later shut it down off the runtime.
    let traces = if config.tracing.export_enabled {
        let tracing_config = config.tracing.clone();
        Some(tokio::task::spawn_blocking(move || otlp_provider(&tracing_config)).await??)
    } else {
        None
    };
    logging::init(&config.observability, traces.as_ref());

    tracing::info!("ecommerce-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.path,
        trace_exporter = %ExporterEndpoint::from(&config.tracing),
        trace_export_enabled = config.tracing.export_enabled,
        service_name = %config.tracing.service_name,
        "Configuration loaded"
    );

    // Schema is created by `shop-cli init-db`, never here.
    let store = Store::from_config(&config.database);
    store.check()?;

    let metrics = MetricsRecorder::new()?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store, metrics);
    server.run(listener, shutdown.subscribe()).await?;

    if let Some(provider) = traces {
        match tokio::task::spawn_blocking(move || provider.shutdown()).await? {
            Ok(()) => tracing::info!("Trace exporter flushed"),
            Err(e) => tracing::warn!(error = %e, "Trace exporter shutdown failed"),
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
