use std::{fmt, io};

/// Crate-wide `Result` type using [`ExporterError`] as the error.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Top-level error type for the exporter.
#[derive(Debug)]
pub enum ExporterError {
    /// Missing or malformed input.
    Config(ConfigError),

    /// Store unreachable, authentication rejected or connection lost.
    Connection(ConnectionError),

    /// Failures while converting or serializing exported data.
    Export(ExportError),

    /// I/O errors.
    Io(io::Error),

    /// Errors reported by the Redis client.
    Redis(redis::RedisError),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Sentinel could not resolve a master for the service name.
    SentinelFailed(String),

    /// Invalid host descriptor.
    InvalidHost(String),

    /// A store call exceeded the response timeout.
    Timeout,
}

/// Export-specific errors.
#[derive(Debug)]
pub enum ExportError {
    /// The store reported a type outside string/list/set/zset/hash.
    UnsupportedType { key: String, type_name: String },

    /// The document could not be serialized.
    Serialization(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExporterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExporterError::Config(e) => write!(f, "Configuration error: {e}"),
            ExporterError::Connection(e) => write!(f, "Connection error: {e}"),
            ExporterError::Export(e) => write!(f, "Export error: {e}"),
            ExporterError::Io(e) => write!(f, "I/O error: {e}"),
            ExporterError::Redis(e) => write!(f, "Redis error: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::SentinelFailed(msg) => {
                write!(f, "Sentinel master lookup failed: {msg}")
            }
            ConnectionError::InvalidHost(host) => write!(f, "Invalid host: {host}"),
            ConnectionError::Timeout => write!(f, "Store call timed out"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::UnsupportedType { key, type_name } => {
                write!(f, "Unsupported type '{type_name}' for key '{key}'")
            }
            ExportError::Serialization(msg) => write!(f, "Failed to serialize document: {msg}"),
        }
    }
}

impl std::error::Error for ExporterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExporterError::Io(e) => Some(e),
            ExporterError::Redis(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ExportError {}

/* ========================= Conversions to ExporterError ========================= */

impl From<io::Error> for ExporterError {
    fn from(err: io::Error) -> Self {
        ExporterError::Io(err)
    }
}

impl From<redis::RedisError> for ExporterError {
    fn from(err: redis::RedisError) -> Self {
        // Dropped sockets and refused connections are connection failures,
        // everything else stays a plain client error.
        if err.is_timeout() {
            ExporterError::Connection(ConnectionError::Timeout)
        } else if err.is_connection_dropped() || err.is_connection_refusal() {
            ExporterError::Connection(ConnectionError::ConnectionFailed(err.to_string()))
        } else {
            ExporterError::Redis(err)
        }
    }
}

impl From<serde_json::Error> for ExporterError {
    fn from(err: serde_json::Error) -> Self {
        ExporterError::Export(ExportError::Serialization(err.to_string()))
    }
}

impl From<ConfigError> for ExporterError {
    fn from(err: ConfigError) -> Self {
        ExporterError::Config(err)
    }
}

impl From<ConnectionError> for ExporterError {
    fn from(err: ConnectionError) -> Self {
        ExporterError::Connection(err)
    }
}

impl From<ExportError> for ExporterError {
    fn from(err: ExportError) -> Self {
        ExporterError::Export(err)
    }
}
