//! `AuthZ` gateway: a small HTTP server whose routes are guarded by the
//! decision gates, one gate kind per route.

mod config;
mod routes;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use authz_decision::DecisionGates;

use crate::config::{GatewayConfig, LoggingConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// YAML config file; `AUTHZ_GATEWAY__*` environment variables override it.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = GatewayConfig::load(cli.config.as_deref())?;
    init_tracing(&cfg.logging);

    let gates = DecisionGates::from_config(&cfg.authz).context("failed to build decision gates")?;
    let app = routes::router(&gates).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;
    tracing::info!(addr = %cfg.server.bind_addr, "authz gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(cfg: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let fmt = tracing_subscriber::fmt().with_env_filter(filter);
    if cfg.json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    tracing::info!("shutting down");
}
