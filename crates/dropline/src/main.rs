//! # dropline
//!
//! Connect Four session broker binary: loads settings, installs logging and
//! metrics, and serves `/ws` until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dropline_core::logging::{LogFormat, init_subscriber};
use dropline_server::config::ServerConfig;
use dropline_server::metrics::install_recorder;
use dropline_server::server::BrokerServer;
use dropline_settings::{DroplineSettings, load_settings_from_path, settings_path};
use tracing::{info, warn};

/// How long open connections get to close after Ctrl-C.
const CONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Dropline session broker.
#[derive(Parser, Debug)]
#[command(name = "dropline", about = "Two-player Connect Four WebSocket broker")]
struct Cli {
    /// Settings file (default `~/.dropline/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Maximum concurrent connections (overrides settings).
    #[arg(long)]
    max_connections: Option<usize>,

    /// Log filter directive, e.g. `info` or `dropline_server=debug`.
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format: `compact` or `json`.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Apply flags on top of loaded settings.
    fn apply(&self, settings: &mut DroplineSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(max) = self.max_connections {
            settings.server.max_connections = max;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        if let Some(format) = self.log_format {
            settings.logging.format = format;
        }
    }

    fn resolve_settings(&self) -> Result<DroplineSettings> {
        let path = self.settings.clone().unwrap_or_else(settings_path);
        let mut settings = load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        self.apply(&mut settings);
        settings.validate().context("Invalid settings")?;
        Ok(settings)
    }
}

/// Wait until every WebSocket connection has finished its close handshake.
async fn drain_connections(server: &BrokerServer) {
    let drained = tokio::time::timeout(CONNECTION_DRAIN_TIMEOUT, async {
        while server.connection_count() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if drained.is_err() {
        warn!(
            open = server.connection_count(),
            "connections still open after drain timeout"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = args.resolve_settings()?;

    init_subscriber(&settings.logging.level, settings.logging.format);
    let metrics = install_recorder().context("Failed to install metrics recorder")?;

    let config = ServerConfig::from(&settings);
    let server = BrokerServer::new(config, metrics);
    let (addr, handle) = server.listen().await.with_context(|| {
        format!(
            "Failed to bind {}:{}",
            settings.server.host, settings.server.port
        )
    })?;
    info!(%addr, "dropline ready, connect to ws://{addr}/ws");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;
    drain_connections(&server).await;
    info!(live_sessions = server.registry().len(), "stopped");
    Ok(())
}
