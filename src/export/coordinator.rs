//! Export coordinator for orchestrating export runs
//!
//! Brings together the key scanner, the value converter, the export document
//! and a document writer. Keys are processed strictly one at a time.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{ExportConfig, UnsupportedTypePolicy};
use crate::error::{ExportError, ExporterError, Result};
use crate::store::KeyStore;

use super::document::ExportDocument;
use super::progress::ProgressTracker;
use super::scanner::KeyScanner;
use super::value::{ValueConverter, ValueType};
use super::writer::DocumentWriter;

/// Options for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// MATCH pattern for SCAN
    pub pattern: String,
    /// COUNT hint for SCAN
    pub scan_count: usize,
    /// What to do with keys of an unsupported type
    pub on_unsupported: UnsupportedTypePolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportConfig::default().into()
    }
}

impl From<ExportConfig> for ExportOptions {
    fn from(config: ExportConfig) -> Self {
        Self {
            pattern: config.pattern,
            scan_count: config.scan_count,
            on_unsupported: config.on_unsupported,
        }
    }
}

/// Result of an export run
#[derive(Debug)]
pub struct ExportResult {
    /// Number of keys written to the document
    pub keys_exported: u64,
    /// Keys of an unsupported type left out under the skip policy
    pub keys_skipped: u64,
    /// Keys that vanished between SCAN and TYPE
    pub keys_missing: u64,
    /// Destination file
    pub path: PathBuf,
    /// File size in bytes
    pub file_size_bytes: u64,
    /// Time taken for the run
    pub elapsed_ms: u64,
}

/// Coordinator for one export run
pub struct ExportCoordinator {
    /// Open store handle
    store: Box<dyn KeyStore>,
    /// Run options
    options: ExportOptions,
    /// Writer for the finished document
    writer: Box<dyn DocumentWriter>,
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(
        store: Box<dyn KeyStore>,
        options: ExportOptions,
        writer: Box<dyn DocumentWriter>,
        tracker: ProgressTracker,
    ) -> Self {
        Self {
            store,
            options,
            writer,
            tracker,
        }
    }

    /// Execute the export run
    ///
    /// 1. Scan the key space
    /// 2. Query each key's type and convert its value
    /// 3. Accumulate entries in the export document
    /// 4. Hand the document to the writer
    ///
    /// Any failure before step 4 returns early and nothing is written.
    pub async fn execute(&mut self) -> Result<ExportResult> {
        info!("Starting export (pattern '{}')", self.options.pattern);

        if self.tracker.is_enabled() {
            match self.store.key_count().await {
                Ok(total) => self.tracker.set_total(total),
                Err(e) => debug!("DBSIZE unavailable: {}", e),
            }
        }

        let result = self.collect().await;
        self.tracker.finish();
        let (document, skipped, missing) = result?;

        debug!("Writing document with {} entries", document.len());
        let file_size_bytes = self.writer.write(&document).await?;

        let result = ExportResult {
            keys_exported: document.len() as u64,
            keys_skipped: skipped,
            keys_missing: missing,
            path: self.writer.path().to_path_buf(),
            file_size_bytes,
            elapsed_ms: self.tracker.elapsed_ms(),
        };

        info!(
            "Export completed: {} keys, {} bytes, {} ms",
            result.keys_exported, result.file_size_bytes, result.elapsed_ms
        );
        Ok(result)
    }

    /// Build the document, returning it with the skipped and missing counts
    async fn collect(&mut self) -> Result<(ExportDocument, u64, u64)> {
        let mut scanner = KeyScanner::new(self.options.pattern.clone(), self.options.scan_count);
        let mut document = ExportDocument::new();
        let mut exported = 0u64;
        let mut skipped = 0u64;
        let mut missing = 0u64;

        while let Some(key) = scanner.next_key(self.store.as_mut()).await? {
            // SCAN may return a key more than once
            if document.contains(&key) {
                debug!("Key '{}' returned again by SCAN, ignoring", key);
                continue;
            }

            let reply = self.store.key_type(&key).await?;
            let kind = match ValueType::parse(&key, &reply) {
                Ok(kind) => kind,
                Err(ExporterError::Export(ExportError::UnsupportedType { key, type_name }))
                    if self.options.on_unsupported == UnsupportedTypePolicy::Skip =>
                {
                    warn!("Skipping key '{}' of unsupported type '{}'", key, type_name);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match ValueConverter::convert(self.store.as_mut(), &key, kind).await? {
                Some(value) => {
                    document.insert(key, value);
                    exported += 1;
                    self.tracker.update(exported);
                }
                None => {
                    debug!("Key '{}' vanished before export", key);
                    missing += 1;
                }
            }

            if scanner.scanned() % 10_000 == 0 {
                info!("Progress: {} keys scanned, {} exported", scanner.scanned(), exported);
            }
        }

        Ok((document, skipped, missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use crate::store::memory::{Entry, MemoryStore};

    // Mock writer that captures the serialized document
    struct MockWriter {
        output: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl DocumentWriter for MockWriter {
        async fn write(&mut self, doc: &ExportDocument) -> Result<u64> {
            let bytes = doc.to_json_pretty(2)?;
            let len = bytes.len() as u64;
            *self.output.lock().unwrap() = Some(String::from_utf8(bytes).unwrap());
            Ok(len)
        }

        fn path(&self) -> &Path {
            Path::new("mock.json")
        }
    }

    fn coordinator(
        store: MemoryStore,
        options: ExportOptions,
    ) -> (ExportCoordinator, Arc<Mutex<Option<String>>>) {
        let output = Arc::new(Mutex::new(None));
        let writer = MockWriter {
            output: output.clone(),
        };
        let coordinator = ExportCoordinator::new(
            Box::new(store),
            options,
            Box::new(writer),
            ProgressTracker::hidden(),
        );
        (coordinator, output)
    }

    fn parsed(output: &Arc<Mutex<Option<String>>>) -> serde_json::Value {
        let text = output.lock().unwrap().clone().expect("document written");
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_string_scenario() {
        let store = MemoryStore::new().insert("greeting", Entry::Str("hello".into()));
        let (mut coordinator, output) = coordinator(store, ExportOptions::default());

        let result = coordinator.execute().await.unwrap();

        assert_eq!(result.keys_exported, 1);
        assert_eq!(result.path, PathBuf::from("mock.json"));
        assert_eq!(parsed(&output), serde_json::json!({"greeting": "hello"}));
    }

    #[tokio::test]
    async fn test_all_types_in_discovery_order() {
        let store = MemoryStore::new()
            .insert("mylist", Entry::List(vec!["a".into(), "b".into(), "c".into()]))
            .insert("lb", Entry::ZSet(vec![("alice".into(), 10.0), ("bob".into(), 20.0)]))
            .insert(
                "user:1",
                Entry::Hash(vec![("name".into(), "x".into()), ("age".into(), "30".into())]),
            )
            .insert("tags", Entry::Set(vec!["red".into()]))
            .insert("greeting", Entry::Str("hello".into()));
        let (mut coordinator, output) = coordinator(store, ExportOptions::default());

        let result = coordinator.execute().await.unwrap();
        assert_eq!(result.keys_exported, 5);

        let text = output.lock().unwrap().clone().unwrap();
        let expected = r#"{
  "mylist": [
    "a",
    "b",
    "c"
  ],
  "lb": [
    {
      "score": 10,
      "value": "alice"
    },
    {
      "score": 20,
      "value": "bob"
    }
  ],
  "user:1": {
    "name": "x",
    "age": "30"
  },
  "tags": [
    "red"
  ],
  "greeting": "hello"
}
"#;
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn test_empty_database() {
        let (mut coordinator, output) = coordinator(MemoryStore::new(), ExportOptions::default());

        let result = coordinator.execute().await.unwrap();

        assert_eq!(result.keys_exported, 0);
        assert_eq!(output.lock().unwrap().as_deref(), Some("{}\n"));
    }

    #[tokio::test]
    async fn test_vanished_key_is_skipped_and_not_counted() {
        let store = MemoryStore::new()
            .insert("a", Entry::Str("1".into()))
            .vanished("ghost")
            .insert("b", Entry::Str("2".into()));
        let (mut coordinator, output) = coordinator(store, ExportOptions::default());

        let result = coordinator.execute().await.unwrap();

        assert_eq!(result.keys_exported, 2);
        assert_eq!(result.keys_missing, 1);
        let doc = parsed(&output);
        assert!(doc.get("ghost").is_none());
        assert_eq!(doc.as_object().unwrap().len() as u64, result.keys_exported);
    }

    #[tokio::test]
    async fn test_unsupported_type_aborts_without_writing() {
        let store = MemoryStore::new()
            .insert("a", Entry::Str("1".into()))
            .insert("events", Entry::Other("stream"));
        let (mut coordinator, output) = coordinator(store, ExportOptions::default());

        let result = coordinator.execute().await;

        assert!(matches!(
            result,
            Err(ExporterError::Export(ExportError::UnsupportedType { .. }))
        ));
        assert!(output.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsupported_type_skip_policy() {
        let store = MemoryStore::new()
            .insert("a", Entry::Str("1".into()))
            .insert("events", Entry::Other("stream"));
        let options = ExportOptions {
            on_unsupported: UnsupportedTypePolicy::Skip,
            ..Default::default()
        };
        let (mut coordinator, output) = coordinator(store, options);

        let result = coordinator.execute().await.unwrap();

        assert_eq!(result.keys_exported, 1);
        assert_eq!(result.keys_skipped, 1);
        assert_eq!(parsed(&output), serde_json::json!({"a": "1"}));
    }

    #[tokio::test]
    async fn test_scan_failure_discards_document() {
        let store = MemoryStore::new()
            .insert("a", Entry::Str("1".into()))
            .insert("b", Entry::Str("2".into()))
            .insert("c", Entry::Str("3".into()))
            .fail_scan_at(2);
        let (mut coordinator, output) = coordinator(store, ExportOptions::default());

        let result = coordinator.execute().await;

        assert!(matches!(result, Err(ExporterError::Connection(_))));
        assert!(output.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_two_runs_are_identical() {
        let build = || {
            MemoryStore::new()
                .insert("lb", Entry::ZSet(vec![("x".into(), 1.5), ("y".into(), -2.0)]))
                .insert("greeting", Entry::Str("hello".into()))
        };

        let (mut first, first_out) = coordinator(build(), ExportOptions::default());
        let (mut second, second_out) = coordinator(build(), ExportOptions::default());
        first.execute().await.unwrap();
        second.execute().await.unwrap();

        assert_eq!(
            *first_out.lock().unwrap(),
            *second_out.lock().unwrap()
        );
    }

    #[test]
    fn test_options_from_config() {
        let config = ExportConfig {
            pattern: "user:*".into(),
            scan_count: 50,
            ..Default::default()
        };
        let options = ExportOptions::from(config);
        assert_eq!(options.pattern, "user:*");
        assert_eq!(options.scan_count, 50);
        assert_eq!(options.on_unsupported, UnsupportedTypePolicy::Abort);
    }
}
