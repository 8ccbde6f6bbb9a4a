//! Audit trail of a letter of credit, rebuilt from the store's version history
use super::error::{ContractError, StoreError};
use super::store::{KeyModification, TxTimestamp, VersionedStore};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

// derived ordering would demand `Utc: Ord`
impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl TryFrom<TxTimestamp> for TimeStamp<Utc> {
    type Error = StoreError;

    fn try_from(value: TxTimestamp) -> Result<Self, Self::Error> {
        value
            .to_datetime_utc()
            .map(TimeStamp)
            .ok_or(StoreError::InvalidTimestamp {
                seconds: value.seconds,
                nanos: value.nanos,
            })
    }
}

// e.g. "2024-06-15 10:30:00.123456789 +0000 UTC"
impl fmt::Display for TimeStamp<Utc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.f %z UTC"))
    }
}

impl Serialize for TimeStamp<Utc> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One version of a letter of credit as shown in its audit trail.
#[derive(Serialize, Debug, Clone)]
pub struct HistoryEntry {
    #[serde(rename = "TxId")]
    pub tx_id: String,
    /// The stored bytes verbatim, `None` (rendered `null`) for a deletion
    #[serde(rename = "Value")]
    pub value: Option<Box<RawValue>>,
    #[serde(rename = "Timestamp")]
    pub timestamp: TimeStamp<Utc>,
    // earlier consumers of this document expect "true"/"false"
    #[serde(rename = "IsDelete", serialize_with = "bool_as_string")]
    pub is_delete: bool,
}

fn bool_as_string<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl HistoryEntry {
    fn from_modification(lc_id: &str, modification: KeyModification) -> Result<Self, ContractError> {
        let timestamp = TimeStamp::try_from(modification.timestamp).map_err(|source| {
            ContractError::HistoryUnavailable {
                lc_id: lc_id.to_string(),
                source,
            }
        })?;

        let value = if modification.is_delete {
            None
        } else {
            let value: Box<RawValue> = serde_json::from_slice(&modification.value).map_err(|err| {
                ContractError::DeserializationFailure {
                    lc_id: lc_id.to_string(),
                    reason: format!("version {}: {}", modification.tx_id, err),
                }
            })?;
            Some(value)
        };

        Ok(Self {
            tx_id: modification.tx_id,
            value,
            timestamp,
            is_delete: modification.is_delete,
        })
    }
}

/// Every version of `lc_id`, oldest first. A key that was never written has
/// an empty history.
pub fn get_lc_history<S: VersionedStore + ?Sized>(
    store: &S,
    lc_id: &str,
) -> Result<Vec<HistoryEntry>, ContractError> {
    let unavailable = |source: StoreError| ContractError::HistoryUnavailable {
        lc_id: lc_id.to_string(),
        source,
    };

    // dropped on every return below, which releases the backend handle
    let versions = store.history(lc_id).map_err(unavailable)?;

    let mut entries = Vec::new();
    for modification in versions {
        let modification = modification.map_err(unavailable)?;
        entries.push(HistoryEntry::from_modification(lc_id, modification)?);
    }

    tracing::debug!(lc_id, versions = entries.len(), "history reconstructed");
    Ok(entries)
}

/// The audit trail as a JSON array.
pub fn render(entries: &[HistoryEntry]) -> Result<String, ContractError> {
    serde_json::to_string(entries).map_err(ContractError::SerializationFailure)
}
