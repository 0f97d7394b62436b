//! Common service runner
//!
//! Boots a service shell from `config/<profile>.properties` and serves the
//! built-in routes.
//!
//! ```text
//!                     ┌──────────────────────────────────────────┐
//!                     │              COMMON SERVICE               │
//!                     │                                          │
//!   config/*.props ───┼─▶ lifecycle::startup ──▶ Logger          │
//!        │            │          │                  │            │
//!        ▼            │          ▼                  ▼            │
//!   config::watcher   │   http::server ──▶ request scope ──▶ JSON │──▶ stdout
//!                     │          │                                │
//!   Client ───────────┼─▶ /_internal/_ping, /swagger/*            │
//!                     │                                          │
//!   Prometheus ───────┼─▶ METRICS_ADDRESS (optional)             │
//!                     └──────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use common_service::config::watcher::ConfigWatcher;
use common_service::lifecycle::startup::{bootstrap_or_exit, init_tracing, StartupOptions};
use common_service::lifecycle::Shutdown;
use common_service::observability::metrics::init_metrics;
use common_service::{errorf, infof, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "common-service")]
#[command(about = "Run a service shell with logging, liveness and API docs", long_about = None)]
struct Cli {
    /// Directory holding `<profile>.properties`; searched upward from the
    /// working directory when omitted.
    #[arg(short, long, env = "CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Properties profile.
    #[arg(short, long, env = "GO_PROFILE")]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let boot = bootstrap_or_exit(&StartupOptions {
        config_dir: cli.config_dir,
        profile: cli.profile,
    });
    init_tracing(&boot.config.logging)?;

    let logger = boot.logger.clone();
    tracing::info!(
        path = ?boot.properties_path,
        level = %boot.config.logging.level,
        dev_debug_mode = boot.config.logging.dev_debug_mode,
        "Configuration loaded"
    );

    if let Some(metrics_address) = &boot.config.metrics_address {
        match metrics_address.parse::<SocketAddr>() {
            Ok(addr) => init_metrics(addr)?,
            Err(e) => errorf!(logger, "invalid METRICS_ADDRESS {}: {}", metrics_address, e),
        }
    }

    // kept alive for the lifetime of the server
    let _watcher = ConfigWatcher::new(&boot.properties_path, boot.properties.clone()).run()?;

    let listener = TcpListener::bind(&boot.config.server_address).await?;
    let shutdown = Shutdown::new();

    let server = HttpServer::new(&boot.config, logger.clone());
    server.run(listener, shutdown.subscribe()).await?;

    infof!(logger, "shutdown complete");
    Ok(())
}
