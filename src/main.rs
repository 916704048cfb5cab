use clap::{Parser, Subcommand};
use mcp_stdio::Result;
use mcp_stdio::commands::{init_logging, load_config, serve_mcp};
use mcp_stdio::config::{get_config_dir, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcp-stdio")]
#[command(about = "JSON-RPC 2.0 server speaking the MCP handshake over stdio")]
#[command(version)]
struct Cli {
    /// Configuration directory (default: ~/.mcp-stdio)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration, writing defaults if none exist
    Config {
        /// Only print, never write the configuration file
        #[arg(long)]
        show: bool,
    },
    /// Start MCP server on stdio
    Serve {
        /// Log level for stderr diagnostics (overrides the config file)
        #[arg(long)]
        log_level: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };

    match cli.command {
        Commands::Config { show } => {
            show_config(&config_dir, show)?;
        }
        Commands::Serve { log_level } => {
            let config = load_config(&config_dir, log_level)?;
            init_logging(&config.logging.level);
            serve_mcp(&config)?;
        }
    }

    Ok(())
}
