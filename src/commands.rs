use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::mcp::{McpServer, ShutdownReason};

/// Install the stderr log subscriber. `RUST_LOG` wins over `default_level`.
///
/// stdout carries only protocol lines, so nothing may log there.
#[inline]
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Load configuration from `config_dir`, applying a log level override
#[inline]
pub fn load_config(config_dir: &Path, log_level: Option<String>) -> Result<Config> {
    let mut config = Config::load(config_dir).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        config
            .logging
            .set_level(level)
            .context("Invalid --log-level")?;
    }
    Ok(config)
}

/// Run the MCP server on stdio until the client closes stdin or Ctrl-C
#[inline]
pub fn serve_mcp(config: &Config) -> Result<ShutdownReason> {
    info!("Starting MCP Server...");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut server = McpServer::new(&config.server);
    let reason = runtime.block_on(server.serve_stdio());

    // A stdin read may still be parked on the blocking pool after Ctrl-C.
    runtime.shutdown_background();

    if reason == ShutdownReason::Fault {
        warn!("Event loop aborted after an unexpected error");
    }
    info!("MCP Server shut down.");
    Ok(reason)
}
