//! Transparent HTTP forwarding gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                   GATEWAY                     │
//!   Client Request       │  ┌──────┐   ┌──────────┐   ┌─────────┐       │
//!   ─────────────────────┼─▶│ CORS │──▶│ id/trace │──▶│ routing │       │
//!                        │  └──────┘   └──────────┘   └────┬────┘       │
//!                        │                  prefix match   │  no match  │
//!                        │                 ┌───────────────┴──────┐     │
//!                        │                 ▼                      ▼     │
//!                        │          ┌────────────┐        ┌───────────┐ │
//!                        │          │ forwarder  │        │  static   │ │
//!                        │          │ + relay    │        │  files    │ │
//!                        │          └─────┬──────┘        └───────────┘ │
//!                        └────────────────┼──────────────────────────────┘
//!                                         ▼
//!                                  Upstream origin
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use relay_gateway::config::{self, validate_config, ConfigError, GatewayConfig};
use relay_gateway::lifecycle::{signals, Shutdown};
use relay_gateway::observability::{logging, metrics};
use relay_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "relay-gateway")]
#[command(about = "Forward a path prefix to one upstream origin and serve static files", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:80.
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream base origin, e.g. http://api.example.com:81.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Directory served for non-proxied paths.
    #[arg(long)]
    static_dir: Option<String>,

    /// Path prefix that is proxied.
    #[arg(long)]
    prefix: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_files.root = static_dir;
        }
        if let Some(prefix) = self.prefix {
            config.proxy.prefix = prefix;
        }
    }
}

fn load(cli: Cli) -> Result<GatewayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::read_config(path)?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load(Cli::parse())?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "relay-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        prefix = %config.proxy.prefix,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::trigger_on_signal(shutdown));

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
