//! Versioned key-value storage consumed by the contract.
//!
//! Every `put` or `delete` appends an immutable version to the key's history;
//! nothing that was written is ever overwritten. Two backends are provided:
//! - `MemoryStore`: in-process map, used by tests and the property suite
//! - `SledStore`: sled-backed store used by the binary

mod memory;
mod sled_store;

pub use memory::{HistoryFault, MemoryStore};
pub use sled_store::SledStore;

use crate::error::StoreError;
use chrono::{DateTime, Utc};

/// Ordered history of one key, oldest version first.
///
/// The backend handle behind the iterator is released when it is dropped, so
/// an early return while iterating cannot leak it.
pub type HistoryIter<'a> = Box<dyn Iterator<Item = Result<KeyModification, StoreError>> + 'a>;

pub trait VersionedStore: Send + Sync {
    /// Append a new version of `key`. Returns the id of the recording transaction.
    fn put(&self, key: &str, value: &[u8]) -> Result<String, StoreError>;

    /// Latest value of `key`, `None` when it was never written or is deleted.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Append a tombstone for `key`.
    fn delete(&self, key: &str) -> Result<String, StoreError>;

    /// Open an iterator over every version of `key`.
    fn history(&self, key: &str) -> Result<HistoryIter<'_>, StoreError>;
}

/// Commit time of a version as a (seconds, nanos) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, minicbor::Encode, minicbor::Decode)]
pub struct TxTimestamp {
    #[n(0)]
    pub seconds: i64,
    #[n(1)]
    pub nanos: i32,
}

impl TxTimestamp {
    pub fn now() -> Self {
        Utc::now().into()
    }

    /// `None` when the pair is outside chrono's representable range.
    pub fn to_datetime_utc(&self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

impl From<DateTime<Utc>> for TxTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            // always below 2e9, fits an i32
            nanos: value.timestamp_subsec_nanos() as i32,
        }
    }
}

/// One entry in a key's history.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct KeyModification {
    #[n(0)]
    pub tx_id: String,
    #[cbor(n(1), with = "minicbor::bytes")]
    pub value: Vec<u8>,
    #[n(2)]
    pub timestamp: TxTimestamp,
    #[n(3)]
    pub is_delete: bool,
}

impl KeyModification {
    pub fn write(tx_id: String, value: Vec<u8>) -> Self {
        Self {
            tx_id,
            value,
            timestamp: TxTimestamp::now(),
            is_delete: false,
        }
    }

    pub fn tombstone(tx_id: String) -> Self {
        Self {
            tx_id,
            value: Vec::new(),
            timestamp: TxTimestamp::now(),
            is_delete: true,
        }
    }
}
