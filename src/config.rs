//! Configuration types and loader
//!
//! All settings have defaults, so the tool runs without any configuration
//! file. A YAML file may override them, and `MIP_TRANSFER_*` environment
//! variables override the file in turn.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// Root configuration structure
///
/// # Example
///
/// ```yaml
/// transfer:
///   connect_timeout_secs: 15
///   read_timeout_secs: 20
///
/// logging:
///   level: info
///   protocol_debug: false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Transfer timeouts
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timeouts applied to every MIP conversation
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// TCP connect deadline in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-read socket timeout in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Hex-trace every frame and codec step
    #[serde(default)]
    pub protocol_debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            protocol_debug: false,
        }
    }
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_read_timeout() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a YAML file
///
/// Also applies MIP_TRANSFER_* env var overrides after loading.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    let mut config: Config = serde_yaml::from_str(&contents)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
pub fn load_config_from_str(yaml: &str) -> Result<Config> {
    let mut config: Config = serde_yaml::from_str(yaml)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Apply MIP_TRANSFER_* environment variable overrides to a config.
///
/// Supported env vars:
/// - `MIP_TRANSFER_CONNECT_TIMEOUT_SECS` - Override connect timeout
/// - `MIP_TRANSFER_READ_TIMEOUT_SECS` - Override per-read timeout
/// - `MIP_TRANSFER_LOG_LEVEL` - Override log level
/// - `MIP_TRANSFER_PROTOCOL_DEBUG` - Enable frame hex tracing (true/1)
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("MIP_TRANSFER_CONNECT_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse::<u64>() {
            debug!("Overriding connect_timeout from MIP_TRANSFER_CONNECT_TIMEOUT_SECS");
            config.transfer.connect_timeout_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("MIP_TRANSFER_READ_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse::<u64>() {
            debug!("Overriding read_timeout from MIP_TRANSFER_READ_TIMEOUT_SECS");
            config.transfer.read_timeout_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("MIP_TRANSFER_LOG_LEVEL") {
        debug!("Overriding log level from MIP_TRANSFER_LOG_LEVEL");
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("MIP_TRANSFER_PROTOCOL_DEBUG") {
        config.logging.protocol_debug = matches!(val.as_str(), "1" | "true" | "TRUE");
    }
}
