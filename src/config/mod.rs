//! Configuration management for redis-export
//!
//! Configuration is loaded from an optional TOML file and then overridden by
//! command-line arguments:
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values
//!
//! Nothing here is global: the resolved [`Config`] is passed explicitly to the
//! connection manager and the export coordinator.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Export configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host descriptor, `host[:port]` or a comma-separated list of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Sentinel service name for high-availability deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    /// Ceiling on any single store call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Export behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// COUNT hint passed to every SCAN call
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,

    /// Indentation width of the output document
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// MATCH pattern passed to SCAN
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// What to do with keys of an unsupported type
    #[serde(default)]
    pub on_unsupported: UnsupportedTypePolicy,
}

/// Policy for keys whose type is outside the five exportable kinds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedTypePolicy {
    /// Fail the whole run before anything is written
    #[default]
    Abort,

    /// Log a warning and leave the key out of the document
    Skip,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_scan_count() -> usize {
    1000
}

fn default_indent() -> usize {
    2
}

fn default_pattern() -> String {
    "*".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            service_name: None,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scan_count: default_scan_count(),
            indent: default_indent(),
            pattern: default_pattern(),
            on_unsupported: UnsupportedTypePolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_toml(&text)
    }

    /// Load configuration from an explicit path, or from the default location
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".redis-export")
            .join("config.toml")
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.timeout == 0 {
            return Err(invalid("connection.timeout", "0"));
        }
        if self.connection.connect_timeout == 0 {
            return Err(invalid("connection.connect_timeout", "0"));
        }
        if self.export.scan_count == 0 {
            return Err(invalid("export.scan_count", "0"));
        }
        if self.export.indent > 16 {
            return Err(invalid("export.indent", &self.export.indent.to_string()));
        }
        if self.export.pattern.is_empty() {
            return Err(invalid("export.pattern", ""));
        }
        Ok(())
    }

    /// Get response timeout as Duration
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.timeout)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.connect_timeout)
    }
}

fn invalid(field: &str, value: &str) -> crate::error::ExporterError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
