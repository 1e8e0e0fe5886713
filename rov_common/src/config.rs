//! Configuration loading traits and types.
//!
//! Configuration is a single TOML file. Every section has defaults, so an
//! empty file (or no file at all) yields a working station that talks to
//! `localhost:50000`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rov_common::config::{ConfigLoader, SurfaceConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SurfaceConfig::load(Path::new("surface.toml"))?;
//!     config.validate()?;
//!     println!("Onboard controller: {}", config.connection.address());
//!     Ok(())
//! }
//! ```
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "surface"
//!
//! [connection]
//! host = "192.168.0.102"
//! port = 50000
//! buffer_size = 4096
//!
//! [control]
//! tick_ms = 10
//!
//! [input]
//! device = "/dev/input/event4"
//! ```

use crate::consts::{
    DEAD_ZONE, DEFAULT_CONNECTION_DATA_SIZE, DEFAULT_CONNECTION_HOST, DEFAULT_CONNECTION_PORT,
    RK_CONNECTION_SURFACE_PI,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across all applications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: "surface".to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Link to the onboard controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Onboard controller host name or IP.
    pub host: String,
    /// Onboard controller TCP port.
    pub port: u16,
    /// Maximum bytes read per exchange iteration.
    pub buffer_size: usize,
    /// Key of this link inside the `connections` partition.
    pub peer: String,
    /// How often the supervisor checks the link status.
    pub poll_interval_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CONNECTION_HOST.to_string(),
            port: DEFAULT_CONNECTION_PORT,
            buffer_size: DEFAULT_CONNECTION_DATA_SIZE,
            peer: RK_CONNECTION_SURFACE_PI.to_string(),
            poll_interval_ms: 1000,
        }
    }
}

impl ConnectionConfig {
    /// `host:port` string used for connecting and logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Control manager loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Period of the control manager loop.
    pub tick_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { tick_ms: 10 }
    }
}

/// Manual input device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Event device to read; discovered automatically when unset.
    pub device: Option<PathBuf>,
    /// Stick values strictly inside `(-dead_zone, dead_zone)` are idle.
    pub dead_zone: i64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device: None,
            dead_zone: DEAD_ZONE,
        }
    }
}

/// Full surface station configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Service-wide settings.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Onboard controller link.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Control manager loop.
    #[serde(default)]
    pub control: ControlConfig,
    /// Manual input device.
    #[serde(default)]
    pub input: InputConfig,
}

impl SurfaceConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` on the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.connection.host.is_empty() {
            return Err(ConfigError::ValidationError(
                "connection.host cannot be empty".to_string(),
            ));
        }
        if self.connection.peer.is_empty() {
            return Err(ConfigError::ValidationError(
                "connection.peer cannot be empty".to_string(),
            ));
        }
        if self.connection.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "connection.buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.connection.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "connection.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.control.tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "control.tick_ms must be greater than 0".to_string(),
            ));
        }
        if self.input.dead_zone < 0 {
            return Err(ConfigError::ValidationError(
                "input.dead_zone cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        for (text, level) in [
            ("trace", LogLevel::Trace),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ] {
            let parsed: TestWrapper = toml::from_str(&format!("level = \"{text}\"")).unwrap();
            assert_eq!(parsed.level, level);
            assert_eq!(level.as_str(), text);
        }
    }

    #[test]
    fn test_defaults_match_the_onboard_controller() {
        let config = SurfaceConfig::default();
        assert_eq!(config.connection.address(), "localhost:50000");
        assert_eq!(config.connection.buffer_size, 4096);
        assert_eq!(config.connection.peer, "surface-pi");
        assert_eq!(config.input.dead_zone, 1025);
        assert!(config.input.device.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: SurfaceConfig = toml::from_str("").unwrap();
        assert_eq!(config.shared.service_name, "surface");
        assert_eq!(config.control.tick_ms, 10);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: SurfaceConfig = toml::from_str(
            r#"
[connection]
host = "192.168.0.102"
"#,
        )
        .unwrap();
        assert_eq!(config.connection.host, "192.168.0.102");
        assert_eq!(config.connection.port, 50000);
    }

    #[test]
    fn test_validation_rejects_zero_buffer() {
        let mut config = SurfaceConfig::default();
        config.connection.buffer_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_rejects_zero_tick() {
        let mut config = SurfaceConfig::default();
        config.control.tick_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }
}
