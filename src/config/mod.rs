// Configuration management module
// Loads the TOML settings file and exposes the effective configuration

pub mod settings;


use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use settings::{Config, ConfigError, LoggingConfig, ServerConfig};

/// Get the default configuration directory path
#[inline]
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    Config::default_dir()
}

/// Print the effective configuration as TOML, writing defaults to disk when
/// no configuration file exists yet.
#[inline]
pub fn show_config<P: AsRef<Path>>(config_dir: P, show_only: bool) -> Result<()> {
    let config = Config::load(&config_dir).context("Failed to load configuration")?;

    if !show_only && !config.config_file_path().exists() {
        config.save().context("Failed to save configuration")?;
        println!(
            "# Wrote default configuration to {}",
            config.config_file_path().display()
        );
    }

    let content = config.to_toml().context("Failed to render configuration")?;
    print!("{}", content);
    Ok(())
}
