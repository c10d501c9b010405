//! Server configuration from flags, an optional TOML file, and the
//! environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use hotseat_engine::TableConfig;
use serde::Deserialize;
use tracing::{debug, info, instrument};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MOVE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_GRACE_DELAY_SECS: u64 = 3;

/// Command-line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "hotseat_server")]
#[command(about = "Shared tic-tac-toe table over HTTP", long_about = None)]
#[command(version)]
pub struct Args {
    /// Port to bind, overriding the config file and the PORT variable
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds a player may stall before a move is made for them
    #[arg(long)]
    pub move_timeout: Option<u64>,

    /// Seconds a finished board stays visible before the next round
    #[arg(long)]
    pub grace_delay: Option<u64>,

    /// File that receives a JSON snapshot of every state change
    #[arg(long)]
    pub mirror: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Contents of the TOML configuration file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Port to bind.
    pub port: Option<u16>,
    /// Move timeout in seconds.
    pub move_timeout: Option<u64>,
    /// Grace delay in seconds.
    pub grace_delay: Option<u64>,
    /// Mirror file path.
    pub mirror: Option<PathBuf>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!("Config file loaded");
        Ok(config)
    }
}

/// Resolved runtime settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to bind.
    pub port: u16,
    /// How long a player may stall before the watchdog moves for them.
    pub move_timeout: Duration,
    /// How long a finished board stays visible.
    pub grace_delay: Duration,
    /// File mirror destination, when one is configured at startup.
    pub mirror: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            move_timeout: Duration::from_secs(DEFAULT_MOVE_TIMEOUT_SECS),
            grace_delay: Duration::from_secs(DEFAULT_GRACE_DELAY_SECS),
            mirror: None,
        }
    }
}

impl ServerConfig {
    /// Resolves the effective configuration. Precedence from highest
    /// to lowest: command-line flags, the TOML file, the PORT
    /// environment variable, then built-in defaults.
    #[instrument(skip(args))]
    pub fn resolve(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        let env_port = std::env::var("PORT").ok().and_then(|p| p.parse().ok());

        let config = Self::merge(args, file, env_port);
        info!(
            port = config.port,
            move_timeout_secs = config.move_timeout.as_secs(),
            grace_delay_secs = config.grace_delay.as_secs(),
            "Configuration resolved"
        );
        Ok(config)
    }

    fn merge(args: Args, file: FileConfig, env_port: Option<u16>) -> Self {
        Self {
            port: args.port.or(file.port).or(env_port).unwrap_or(DEFAULT_PORT),
            move_timeout: Duration::from_secs(
                args.move_timeout
                    .or(file.move_timeout)
                    .unwrap_or(DEFAULT_MOVE_TIMEOUT_SECS),
            ),
            grace_delay: Duration::from_secs(
                args.grace_delay
                    .or(file.grace_delay)
                    .unwrap_or(DEFAULT_GRACE_DELAY_SECS),
            ),
            mirror: args.mirror.or(file.mirror),
        }
    }

    /// Timing knobs for the table this server fronts.
    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            move_timeout: self.move_timeout,
            grace_delay: self.grace_delay,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
