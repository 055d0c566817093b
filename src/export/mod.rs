//! Export pipeline for dumping a Redis database to JSON
//!
//! The pipeline is built from four pieces:
//!
//! 1. **KeyScanner**: walks the key space with cursor-based `SCAN`
//! 2. **ValueConverter**: reads one key by type and converts it to JSON
//! 3. **ExportDocument**: the insertion-ordered accumulator for a run
//! 4. **DocumentWriter**: persists the finished document
//!
//! These are orchestrated by the **ExportCoordinator**, which processes keys
//! one at a time and only writes once the whole key space has been read.
//!
//! # Example
//!
//! ```no_run
//! use redis_export::connection::{ConnectionManager, ConnectionSettings};
//! use redis_export::export::{ExportCoordinator, ExportOptions, JsonFileWriter, ProgressTracker};
//!
//! # async fn run() -> redis_export::Result<()> {
//! let settings = ConnectionSettings::new("localhost", None, 0, None)?;
//! let store = ConnectionManager::new(settings).connect().await?;
//!
//! let mut coordinator = ExportCoordinator::new(
//!     Box::new(store),
//!     ExportOptions::default(),
//!     Box::new(JsonFileWriter::new("dump.json", 2)),
//!     ProgressTracker::hidden(),
//! );
//! let result = coordinator.execute().await?;
//! println!("Exported {} keys to {}", result.keys_exported, result.path.display());
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod document;
pub mod progress;
pub mod scanner;
pub mod value;
pub mod writer;

pub use coordinator::{ExportCoordinator, ExportOptions, ExportResult};
pub use document::ExportDocument;
pub use progress::ProgressTracker;
pub use scanner::KeyScanner;
pub use value::{ExportedValue, ScoredMember, ValueConverter, ValueType};
pub use writer::{DocumentWriter, JsonFileWriter};
