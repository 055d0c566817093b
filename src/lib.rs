//! Redis to JSON export library
//!
//! This library provides the pieces behind the `redis-export` binary: it
//! scans one logical database of a Redis-compatible store and serializes every
//! key into a single JSON document.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: Redis connection management (direct and sentinel)
//! - `error`: Error types and handling
//! - `export`: Key scanning, value conversion and document writing
//! - `store`: The store access trait and its Redis implementation

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectionManager, ConnectionSettings};
pub use error::{ExporterError, Result};
pub use export::{ExportCoordinator, ExportOptions, ExportResult};
pub use store::{KeyStore, RedisStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
