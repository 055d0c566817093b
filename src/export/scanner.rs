//! Cursor-driven key enumeration
//!
//! [`KeyScanner`] walks the key space with `SCAN`, holding at most one batch
//! of keys in memory and handing them out one at a time.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::Result;
use crate::store::KeyStore;

/// Lazy, finite, non-restartable sequence of keys
///
/// The scanner owns only the cursor and the current batch; the store is
/// borrowed per call so the caller can issue reads between keys.
pub struct KeyScanner {
    pattern: String,
    count: usize,
    cursor: u64,
    buffer: VecDeque<String>,
    /// Set once the store has returned cursor 0
    finished: bool,
    scanned: u64,
}

impl KeyScanner {
    /// Create a scanner
    ///
    /// # Arguments
    /// * `pattern` - MATCH pattern for SCAN
    /// * `count` - COUNT hint for SCAN
    pub fn new(pattern: impl Into<String>, count: usize) -> Self {
        Self {
            pattern: pattern.into(),
            count: count.max(1),
            cursor: 0,
            buffer: VecDeque::new(),
            finished: false,
            scanned: 0,
        }
    }

    /// Next key, or `None` once the key space is exhausted
    ///
    /// A store error ends the enumeration: every later call returns `None`.
    pub async fn next_key<S: KeyStore + ?Sized>(&mut self, store: &mut S) -> Result<Option<String>> {
        loop {
            if let Some(key) = self.buffer.pop_front() {
                self.scanned += 1;
                return Ok(Some(key));
            }
            if self.finished {
                return Ok(None);
            }

            let (next, keys) = match store.scan(self.cursor, &self.pattern, self.count).await {
                Ok(step) => step,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            };
            debug!("SCAN cursor {} returned {} keys", self.cursor, keys.len());

            self.buffer.extend(keys);
            self.cursor = next;
            if next == 0 {
                self.finished = true;
            }
        }
    }

    /// Number of keys handed out so far
    pub fn scanned(&self) -> u64 {
        self.scanned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{Entry, MemoryStore};

    fn store_with(n: usize) -> MemoryStore {
        (0..n).fold(MemoryStore::new().with_page(3), |store, i| {
            store.insert(&format!("key:{i}"), Entry::Str(i.to_string()))
        })
    }

    #[tokio::test]
    async fn test_scanner_yields_every_key_in_order() {
        let mut store = store_with(7);
        let mut scanner = KeyScanner::new("*", 100);

        let mut keys = Vec::new();
        while let Some(key) = scanner.next_key(&mut store).await.unwrap() {
            keys.push(key);
        }

        let expected: Vec<String> = (0..7).map(|i| format!("key:{i}")).collect();
        assert_eq!(keys, expected);
        assert_eq!(scanner.scanned(), 7);
        // 7 keys, 3 per page
        assert_eq!(store.scan_calls, 3);
    }

    #[tokio::test]
    async fn test_scanner_is_not_restartable() {
        let mut store = store_with(2);
        let mut scanner = KeyScanner::new("*", 10);

        while scanner.next_key(&mut store).await.unwrap().is_some() {}
        let calls = store.scan_calls;

        assert!(scanner.next_key(&mut store).await.unwrap().is_none());
        assert_eq!(store.scan_calls, calls);
    }

    #[tokio::test]
    async fn test_scanner_empty_database() {
        let mut store = MemoryStore::new();
        let mut scanner = KeyScanner::new("*", 10);
        assert!(scanner.next_key(&mut store).await.unwrap().is_none());
        assert_eq!(store.scan_calls, 1);
    }

    #[tokio::test]
    async fn test_scanner_stops_after_error() {
        let mut store = store_with(5).fail_scan_at(3);
        let mut scanner = KeyScanner::new("*", 10);

        for _ in 0..3 {
            assert!(scanner.next_key(&mut store).await.unwrap().is_some());
        }
        assert!(scanner.next_key(&mut store).await.is_err());
        assert!(scanner.next_key(&mut store).await.unwrap().is_none());
    }
}
