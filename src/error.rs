use crate::record::LcStatus;

#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("Not able to parse args into {expected}: {reason}")]
    MalformedInput {
        expected: &'static str,
        reason: String,
    },
    #[error("Issue with LC json unmarshaling for '{lc_id}': {reason}")]
    DeserializationFailure { lc_id: String, reason: String },
    #[error("Issue with LC json marshaling: {0}")]
    SerializationFailure(#[source] serde_json::Error),
    #[error("Error retrieving LC history for '{lc_id}': {source}")]
    HistoryUnavailable {
        lc_id: String,
        #[source]
        source: StoreError,
    },
    /// `from` is `None` when the existing record could not be decoded.
    #[error("LC '{lc_id}' cannot move from {} to {to}", describe_status(.from))]
    InvalidTransition {
        lc_id: String,
        from: Option<LcStatus>,
        to: LcStatus,
    },
    #[error("Unknown contract function '{0}'")]
    UnknownFunction(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sled backend failure: {0}")]
    Sled(#[from] sled::Error),
    #[error("failed to encode version entry: {0}")]
    Encode(String),
    #[error("failed to decode version entry: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("version timestamp out of range: {seconds}s {nanos}ns")]
    InvalidTimestamp { seconds: i64, nanos: i32 },
    #[error("key of {0} bytes is too long for the version log")]
    KeyTooLong(usize),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

fn describe_status(status: &Option<LcStatus>) -> String {
    status.map_or_else(|| "an unreadable record".to_string(), |s| s.to_string())
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for StoreError {
    fn from(err: minicbor::encode::Error<E>) -> Self {
        StoreError::Encode(err.to_string())
    }
}
