//! Configuration management for the MSI language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional TOML configuration file

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Script the rows viewer loads when nothing else is configured.
pub const DEFAULT_SCRIPT: &str = "element.js";

/// Command-line arguments for the MSI language server
#[derive(Debug, Default, Parser)]
#[command(name = "msi-ls")]
#[command(about = "Host-side services for viewing Windows Installer packages")]
#[command(version)]
pub struct Args {
    /// Script bundled with the rows viewer
    #[arg(long, help = "Script the rows viewer loads (default: element.js)")]
    pub script: Option<String>,

    /// Configuration file to read instead of the default location
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Log level for the language server
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

/// Settings read from the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    pub script: Option<String>,
    pub log_level: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Script referenced by the rows viewer's HTML shell
    pub script: String,
    /// Log level
    pub log_level: String,
    /// Configuration file that was read, if any
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script: DEFAULT_SCRIPT.to_string(),
            log_level: "info".to_string(),
            config_file: None,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        // An explicit path must exist; the default location is optional
        let config_file = match args.config {
            Some(path) => Some(path),
            None => default_config_path().filter(|path| path.is_file()),
        };

        let file = match &config_file {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let defaults = Config::default();
        Ok(Config {
            script: args.script.or(file.script).unwrap_or(defaults.script),
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            config_file,
        })
    }
}

/// `<config dir>/msi-ls/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("msi-ls").join("config.toml"))
}
