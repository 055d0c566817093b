//! Document writers for export runs
//!
//! The JSON file writer serializes the whole document once and replaces the
//! destination atomically: the bytes go to a temporary file next to the
//! destination, which is then renamed over it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;

use super::document::ExportDocument;

/// Trait for persisting a finished export document
#[async_trait]
pub trait DocumentWriter: Send {
    /// Write the document, returning the number of bytes written
    async fn write(&mut self, doc: &ExportDocument) -> Result<u64>;

    /// Destination path, for reporting
    fn path(&self) -> &Path;
}

/// Writes indented JSON to a file, replacing any previous file
pub struct JsonFileWriter {
    path: PathBuf,
    indent: usize,
}

impl JsonFileWriter {
    /// Create a new JSON file writer
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `indent` - Indentation width
    pub fn new(path: impl Into<PathBuf>, indent: usize) -> Self {
        Self {
            path: path.into(),
            indent,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    async fn write_temp(&self, temp: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(temp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// Check that the parent directory of `path` exists
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory does not exist: {}", parent.display()),
            )
            .into());
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentWriter for JsonFileWriter {
    async fn write(&mut self, doc: &ExportDocument) -> Result<u64> {
        validate_path(&self.path)?;
        let bytes = doc.to_json_pretty(self.indent)?;

        let temp = self.temp_path();
        debug!("Writing {} bytes to {}", bytes.len(), temp.display());

        if let Err(e) = self.write_temp(&temp, &bytes).await {
            if fs::remove_file(&temp).await.is_err() {
                warn!("Could not remove temporary file {}", temp.display());
            }
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!("Replaced {} ({} entries)", self.path.display(), doc.len());
        Ok(bytes.len() as u64)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExporterError;
    use crate::export::value::ExportedValue;

    fn temp_output(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("redis-export-{}-{}", Uuid::new_v4().simple(), name))
    }

    #[tokio::test]
    async fn test_writes_indented_json() {
        let path = temp_output("basic.json");
        let mut doc = ExportDocument::new();
        doc.insert("greeting".into(), ExportedValue::Text(Some("hello".into())));

        let mut writer = JsonFileWriter::new(&path, 2);
        let written = tokio_test::assert_ok!(writer.write(&doc).await);

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "{\n  \"greeting\": \"hello\"\n}\n");
        assert_eq!(written, content.len() as u64);

        fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_replaces_existing_file_without_leftovers() {
        let dir = temp_output("dir");
        fs::create_dir(&dir).await.unwrap();
        let path = dir.join("dump.json");
        fs::write(&path, "stale contents that are longer than the new file")
            .await
            .unwrap();

        let mut writer = JsonFileWriter::new(&path, 2);
        writer.write(&ExportDocument::new()).await.unwrap();

        assert_eq!(fs::read_to_string(&path).await.unwrap(), "{}\n");

        let mut entries = fs::read_dir(&dir).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name());
        }
        assert_eq!(names.len(), 1);

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let mut writer = JsonFileWriter::new("/nonexistent/directory/dump.json", 2);
        let err = tokio_test::assert_err!(writer.write(&ExportDocument::new()).await);
        assert!(matches!(err, ExporterError::Io(_)));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let writer = JsonFileWriter::new("/data/out/dump.json", 2);
        let temp = writer.temp_path();
        assert_eq!(temp.parent(), Some(Path::new("/data/out")));
        assert!(temp.file_name().unwrap().to_string_lossy().starts_with(".dump.json."));
        assert_eq!(writer.path(), Path::new("/data/out/dump.json"));
    }
}
