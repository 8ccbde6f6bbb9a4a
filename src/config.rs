//! Ledger configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::contract::TransitionPolicy;
use crate::error::StoreError;
use crate::store::SledStore;

/// Where and how the sled database is opened, and how transitions are checked.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Database directory.
    pub db_path: PathBuf,

    /// Throw the database away when it is closed.
    pub temporary: bool,

    /// Page cache size in bytes.
    pub cache_capacity: u64,

    /// Background flush interval. `None` leaves flushing to explicit calls.
    pub flush_every_ms: Option<u64>,

    pub policy: TransitionPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("lc-ledger.db"),
            temporary: false,
            cache_capacity: 64 * 1024 * 1024,
            flush_every_ms: Some(500),
            policy: TransitionPolicy::Lenient,
        }
    }
}

impl LedgerConfig {
    pub fn sled_config(&self) -> sled::Config {
        sled::Config::new()
            .path(&self.db_path)
            .temporary(self.temporary)
            .cache_capacity(self.cache_capacity)
            .flush_every_ms(self.flush_every_ms)
    }

    pub fn open_store(&self) -> Result<SledStore, StoreError> {
        let db = self.sled_config().open()?;
        tracing::debug!(path = %self.db_path.display(), temporary = self.temporary, "ledger opened");
        Ok(SledStore::new(Arc::new(db)))
    }
}
