//! The in-memory export document

use serde_json::{Map, Value};

use super::value::ExportedValue;

/// Insertion-ordered mapping from key name to exported value
///
/// Entries are only ever added; the document is handed to a writer once at
/// the end of a run.
#[derive(Debug, Default)]
pub struct ExportDocument {
    entries: Map<String, Value>,
}

impl ExportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a key already present keeps its first value
    ///
    /// Returns `false` when the key was already in the document.
    pub fn insert(&mut self, key: String, value: ExportedValue) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into_json());
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize with the given indentation width
    pub fn to_json_pretty(&self, indent: usize) -> serde_json::Result<Vec<u8>> {
        use serde::Serialize;

        let indent = " ".repeat(indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.entries.serialize(&mut serializer)?;
        out.push(b'\n');
        Ok(out)
    }
}
