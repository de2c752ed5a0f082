//! Google Apps Script Proxy
//!
//! Exposes a GAS web app under `/api/*` with permissive CORS so browser
//! front ends can call it directly.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request            ┌──────────────────────────────────────────────┐
//!     ──────────────────────────┼─▶ CORS + request-id layers                    │
//!                               │        │                                     │
//!                               │        ▼                                     │
//!                               │   method gate ── OPTIONS ─▶ 200 (preflight)  │
//!                               │        │ GET        other ─▶ 405             │
//!                               │        ▼                                     │
//!                               │   routing::path ─▶ http::request             │
//!                               │   (logical path)   (outbound URL)            │
//!                               │                         │                    │
//!     Client Response           │                         ▼                    │
//!     ◀─────────────────────────┼── http::response ◀── http::upstream ◀────────┼──── Apps Script
//!                               │   (JSON or text)     (single GET)            │
//!                               └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gas_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use gas_proxy::lifecycle::{signals, Shutdown};
use gas_proxy::observability::{logging, metrics};
use gas_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "gas-proxy")]
#[command(about = "CORS-enabled proxy in front of a Google Apps Script web app", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Route prefix, overrides `backend.mount_prefix`.
    #[arg(long)]
    mount_prefix: Option<String>,

    /// Apps Script web app URL, overrides `backend.base_url`.
    #[arg(long, env = "GAS_BASE_URL")]
    base_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(prefix) = self.mount_prefix {
            config.backend.mount_prefix = prefix;
        }
        if let Some(base_url) = self.base_url.filter(|u| !u.is_empty()) {
            config.backend.base_url = Some(base_url);
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("gas-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_prefix = %config.backend.mount_prefix,
        backend_configured = config.backend.base_url.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
