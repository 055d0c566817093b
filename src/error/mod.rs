//! Error handling for export runs.
//!
//! Every failure is surfaced to the top level unchanged; nothing in the
//! pipeline retries or recovers locally. Errors fall into four families:
//! - Configuration errors, detected before any network activity
//! - Connection errors, raised while reaching or talking to the store
//! - Export errors, such as a key of an unsupported type
//! - I/O errors from the final write step

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, ConnectionError, ExportError, ExporterError, Result};
