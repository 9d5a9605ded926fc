//! Configuration module for echo-httpd.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::protocols::http::Limits;

/// Command-line arguments for the HTTP server
#[derive(Parser, Debug)]
#[command(name = "echo-httpd")]
#[command(author = "echo-httpd authors")]
#[command(version = "0.1.0")]
#[command(about = "A minimal HTTP/1.1 server with an echo route", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 0.0.0.0:42069)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Maximum number of pending connections
    #[arg(short = 'b', long)]
    pub backlog: Option<i32>,

    /// Maximum bytes read from a client request
    #[arg(short = 'r', long)]
    pub read_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Listen backlog
    #[serde(default = "default_backlog")]
    pub backlog: i32,
    /// Single-read request size
    #[serde(default = "default_read_size")]
    pub read_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            backlog: default_backlog(),
            read_size: default_read_size(),
        }
    }
}

/// Request-line size limits
#[derive(Debug, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default = "default_max_method_length")]
    pub max_method_length: usize,
    #[serde(default = "default_max_route_length")]
    pub max_route_length: usize,
    #[serde(default = "default_max_version_length")]
    pub max_version_length: usize,
    #[serde(default = "default_max_echo_length")]
    pub max_echo_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            max_method_length: default_max_method_length(),
            max_route_length: default_max_route_length(),
            max_version_length: default_max_version_length(),
            max_echo_length: default_max_echo_length(),
        }
    }
}

impl From<LimitsConfig> for Limits {
    fn from(c: LimitsConfig) -> Self {
        Limits {
            max_line_length: c.max_line_length,
            max_method_length: c.max_method_length,
            max_route_length: c.max_route_length,
            max_version_length: c.max_version_length,
            max_echo_length: c.max_echo_length,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:42069".to_string()
}

fn default_backlog() -> i32 {
    5
}

fn default_read_size() -> usize {
    255
}

fn default_max_line_length() -> usize {
    Limits::default().max_line_length
}

fn default_max_method_length() -> usize {
    Limits::default().max_method_length
}

fn default_max_route_length() -> usize {
    Limits::default().max_route_length
}

fn default_max_version_length() -> usize {
    Limits::default().max_version_length
}

fn default_max_echo_length() -> usize {
    Limits::default().max_echo_length
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub backlog: i32,
    pub read_size: usize,
    pub limits: Limits,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Merge parsed CLI args with the TOML file they point at, if any.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let listen = cli.listen.unwrap_or(toml_config.server.listen);
        let listen = listen
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid(format!("listen address '{}'", listen)))?;

        let config = Config {
            listen,
            backlog: cli.backlog.unwrap_or(toml_config.server.backlog),
            read_size: cli.read_size.unwrap_or(toml_config.server.read_size),
            limits: toml_config.limits.into(),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backlog <= 0 {
            return Err(ConfigError::Invalid("backlog must be positive".to_string()));
        }
        if self.read_size == 0 {
            return Err(ConfigError::Invalid("read_size must be positive".to_string()));
        }
        let limits = &self.limits;
        let fields = [
            ("max_line_length", limits.max_line_length),
            ("max_method_length", limits.max_method_length),
            ("max_route_length", limits.max_route_length),
            ("max_version_length", limits.max_version_length),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
