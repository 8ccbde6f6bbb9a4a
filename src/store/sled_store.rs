//! sled-backed versioned store
use std::sync::Arc;

use sled::{Batch, Db};

use super::{HistoryIter, KeyModification, VersionedStore};
use crate::error::StoreError;
use crate::utils;

// latest value of a key
const LATEST_PREFIX: &[u8] = b"s/";
// one entry per version, ordered by sequence number
const HISTORY_PREFIX: &[u8] = b"h/";

pub struct SledStore {
    instance: Arc<Db>,
}

impl SledStore {
    pub fn new(instance: Arc<Db>) -> Self {
        Self { instance }
    }

    /// Block until everything written so far is durable.
    pub fn flush(&self) -> Result<usize, StoreError> {
        Ok(self.instance.flush()?)
    }

    fn latest_key(key: &str) -> Vec<u8> {
        [LATEST_PREFIX, key.as_bytes()].concat()
    }

    // Length-prefixed so that "lc1" never scans the versions of "lc10".
    fn history_prefix(key: &str) -> Result<Vec<u8>, StoreError> {
        let len = encode_key_len(key.len())?;
        Ok([HISTORY_PREFIX, &len, key.as_bytes()].concat())
    }

    /// Write `entry` to the history and update (or clear) the latest value in one batch
    fn append(&self, key: &str, entry: KeyModification) -> Result<String, StoreError> {
        // big-endian keeps sled's lexicographic order chronological
        let seq = self.instance.generate_id()?;
        let mut history_key = Self::history_prefix(key)?;
        history_key.extend_from_slice(&seq.to_be_bytes());

        let mut batch = Batch::default();
        if entry.is_delete {
            batch.remove(Self::latest_key(key));
        } else {
            batch.insert(Self::latest_key(key), entry.value.as_slice());
        }
        batch.insert(history_key, minicbor::to_vec(&entry)?);
        self.instance.apply_batch(batch)?;

        tracing::debug!(key, seq, tx_id = %entry.tx_id, is_delete = entry.is_delete, "version appended");
        Ok(entry.tx_id)
    }
}

fn encode_key_len(len: usize) -> Result<[u8; 4], StoreError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| StoreError::KeyTooLong(len))
}

impl VersionedStore for SledStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<String, StoreError> {
        self.append(
            key,
            KeyModification::write(utils::new_tx_id(key), value.to_vec()),
        )
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self.instance.get(Self::latest_key(key))?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn delete(&self, key: &str) -> Result<String, StoreError> {
        self.append(key, KeyModification::tombstone(utils::new_tx_id(key)))
    }

    fn history(&self, key: &str) -> Result<HistoryIter<'_>, StoreError> {
        let iter = self
            .instance
            .scan_prefix(Self::history_prefix(key)?)
            .map(|item| -> Result<KeyModification, StoreError> {
                let (_, bytes) = item?;
                Ok(minicbor::decode(&bytes)?)
            });
        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temporary_store() -> SledStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledStore::new(Arc::new(db))
    }

    #[test]
    fn history_is_chronological() {
        let store = temporary_store();
        for n in 0..5u8 {
            store.put("lc", &[n]).unwrap();
        }

        let values: Vec<Vec<u8>> = store
            .history("lc")
            .unwrap()
            .map(|entry| entry.unwrap().value)
            .collect();
        assert_eq!(values, vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn prefix_keys_do_not_share_history() {
        let store = temporary_store();
        store.put("lc1", b"a").unwrap();
        store.put("lc10", b"b").unwrap();

        assert_eq!(store.history("lc1").unwrap().count(), 1);
        assert_eq!(store.history("lc10").unwrap().count(), 1);
    }

    #[test]
    fn delete_clears_latest_value() {
        let store = temporary_store();
        store.put("lc", b"a").unwrap();
        store.delete("lc").unwrap();

        assert_eq!(store.get("lc").unwrap(), None);
        let last = store.history("lc").unwrap().last().unwrap().unwrap();
        assert!(last.is_delete);
        assert!(last.value.is_empty());
    }

    #[test]
    fn key_length_is_encoded_big_endian() {
        assert_eq!(encode_key_len(2).unwrap(), [0, 0, 0, 2]);
        assert_eq!(encode_key_len(u32::MAX as usize).unwrap(), [0xff; 4]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_key_length_is_rejected() {
        let too_long = u32::MAX as usize + 1;
        assert!(matches!(
            encode_key_len(too_long),
            Err(StoreError::KeyTooLong(len)) if len == too_long
        ));
    }
}
