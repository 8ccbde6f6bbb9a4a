use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::{HistoryIter, KeyModification, VersionedStore};
use crate::error::StoreError;
use crate::utils;

/// Failure injected into history iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFault {
    /// `history` itself fails.
    OnOpen,
    /// The iterator yields this many entries and then an error.
    AfterEntries(usize),
}

/// In-memory versioned store.
///
/// Keeps every version per key and counts history iterators that are still
/// alive, which lets tests check that iteration always releases its handle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    versions: RwLock<HashMap<String, Vec<KeyModification>>>,
    open_iterators: Arc<AtomicUsize>,
    history_fault: RwLock<Option<HistoryFault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of versions recorded for `key`, tombstones included.
    pub fn version_count(&self, key: &str) -> usize {
        self.versions
            .read()
            .map(|map| map.get(key).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Keys with at least one recorded version.
    pub fn key_count(&self) -> usize {
        self.versions.read().map(|map| map.len()).unwrap_or(0)
    }

    /// History iterators handed out and not yet dropped.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    pub fn set_history_fault(&self, fault: Option<HistoryFault>) {
        if let Ok(mut slot) = self.history_fault.write() {
            *slot = fault;
        }
    }

    fn append(&self, key: &str, entry: KeyModification) -> Result<String, StoreError> {
        let mut map = self
            .versions
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        let tx_id = entry.tx_id.clone();
        map.entry(key.to_string()).or_default().push(entry);
        Ok(tx_id)
    }
}

impl VersionedStore for MemoryStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<String, StoreError> {
        let entry = KeyModification::write(utils::new_tx_id(key), value.to_vec());
        self.append(key, entry)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let map = self
            .versions
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(map
            .get(key)
            .and_then(|versions| versions.last())
            .filter(|latest| !latest.is_delete)
            .map(|latest| latest.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<String, StoreError> {
        let entry = KeyModification::tombstone(utils::new_tx_id(key));
        self.append(key, entry)
    }

    fn history(&self, key: &str) -> Result<HistoryIter<'_>, StoreError> {
        let fault = *self
            .history_fault
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        if fault == Some(HistoryFault::OnOpen) {
            return Err(StoreError::Unavailable(format!(
                "history iterator for '{key}' could not be opened"
            )));
        }

        let snapshot = self
            .versions
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?
            .get(key)
            .cloned()
            .unwrap_or_default();

        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryHistory {
            entries: snapshot.into_iter(),
            yielded: 0,
            fail_after: match fault {
                Some(HistoryFault::AfterEntries(n)) => Some(n),
                _ => None,
            },
            failed: false,
            open: Arc::clone(&self.open_iterators),
        }))
    }
}

struct MemoryHistory {
    entries: std::vec::IntoIter<KeyModification>,
    yielded: usize,
    fail_after: Option<usize>,
    failed: bool,
    open: Arc<AtomicUsize>,
}

impl Iterator for MemoryHistory {
    type Item = Result<KeyModification, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.fail_after == Some(self.yielded) {
            self.failed = true;
            return Some(Err(StoreError::Unavailable(
                "history iterator failed to advance".into(),
            )));
        }
        let entry = self.entries.next()?;
        self.yielded += 1;
        Some(Ok(entry))
    }
}

impl Drop for MemoryHistory {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
