//! Letter of credit state machine
//!
//! `LcContract` holds no state between calls. Every transition reads the
//! current version from the store, derives the next one and writes it back
//! with a single `put`, so a failed call leaves the store untouched.
use super::error::ContractError;
use super::history;
use super::record::{LcIdPayload, LcStatus, LetterOfCredit, RequestPayload};
use super::store::VersionedStore;

/// How strictly transitions are checked against the current status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Only require that the record exists. A request may overwrite an
    /// existing record and an LC may be accepted straight from `Requested`.
    #[default]
    Lenient,
    /// Only allow Requested -> Issued -> Accepted, one step at a time.
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LcContract {
    policy: TransitionPolicy,
}

impl LcContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Nothing to migrate
    pub fn init(&self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Load the current record for `lc_id`. A missing record is reported the
    /// same way as an undecodable one.
    fn load_lc<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        lc_id: &str,
    ) -> Result<LetterOfCredit, ContractError> {
        let bytes = store
            .get(lc_id)?
            .ok_or_else(|| ContractError::DeserializationFailure {
                lc_id: lc_id.to_string(),
                reason: "no record stored under this id".into(),
            })?;
        let lc = LetterOfCredit::from_bytes(lc_id, &bytes)?;

        if lc.id() != lc_id {
            return Err(ContractError::DeserializationFailure {
                lc_id: lc_id.to_string(),
                reason: format!("stored record carries lcId '{}'", lc.id()),
            });
        }
        Ok(lc)
    }

    fn check_transition(
        &self,
        lc_id: &str,
        from: LcStatus,
        to: LcStatus,
    ) -> Result<(), ContractError> {
        if self.policy == TransitionPolicy::Strict && from.next() != Some(to) {
            return Err(ContractError::InvalidTransition {
                lc_id: lc_id.to_string(),
                from: Some(from),
                to,
            });
        }
        Ok(())
    }

    /// Initiated by the buyer. Creates a fresh record in `Requested`.
    pub fn request_lc<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        args: &str,
    ) -> Result<LetterOfCredit, ContractError> {
        let payload = RequestPayload::parse(args).inspect_err(|err| {
            tracing::warn!(error = %err, "rejected RequestLC payload");
        })?;
        let lc = payload.into_record();

        if self.policy == TransitionPolicy::Strict {
            if let Some(bytes) = store.get(lc.id())? {
                let from = LetterOfCredit::from_bytes(lc.id(), &bytes)
                    .ok()
                    .map(|current| current.status());
                return Err(ContractError::InvalidTransition {
                    lc_id: lc.id().to_string(),
                    from,
                    to: LcStatus::Requested,
                });
            }
        }

        let tx_id = store.put(lc.id(), &lc.to_bytes()?)?;
        tracing::info!(lc_id = lc.id(), %tx_id, amount = lc.amount(), "LC requested");

        Ok(lc)
    }

    /// Initiated by the bank once the request is approved.
    pub fn issue_lc<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        args: &str,
    ) -> Result<LetterOfCredit, ContractError> {
        self.advance(store, args, LcStatus::Issued)
    }

    /// Initiated by the seller.
    pub fn accept_lc<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        args: &str,
    ) -> Result<LetterOfCredit, ContractError> {
        self.advance(store, args, LcStatus::Accepted)
    }

    fn advance<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        args: &str,
        to: LcStatus,
    ) -> Result<LetterOfCredit, ContractError> {
        let LcIdPayload { id } = LcIdPayload::parse(args).inspect_err(|err| {
            tracing::warn!(error = %err, target_status = %to, "rejected transition payload");
        })?;

        let current = self.load_lc(store, &id)?;
        self.check_transition(&id, current.status(), to)?;

        let next = current.with_status(to);
        let tx_id = store.put(&id, &next.to_bytes()?)?;
        tracing::info!(lc_id = %id, %tx_id, from = %current.status(), to = %to, "LC status advanced");

        Ok(next)
    }

    /// Latest stored bytes for `lc_id`. A missing record is not an error.
    pub fn get_lc<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        lc_id: &str,
    ) -> Result<Option<Vec<u8>>, ContractError> {
        let value = store.get(lc_id)?;
        tracing::debug!(lc_id, found = value.is_some(), "LC read");
        Ok(value)
    }

    /// The audit trail of `lc_id` as a JSON array, oldest version first.
    pub fn get_lc_history<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        lc_id: &str,
    ) -> Result<String, ContractError> {
        let entries = history::get_lc_history(store, lc_id)?;
        history::render(&entries)
    }

    /// Dispatch a named contract function. Transitions answer with an empty
    /// payload; a read of a missing LC also answers empty.
    pub fn invoke<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        function: &str,
        args: &str,
    ) -> Result<Vec<u8>, ContractError> {
        match canonical_name(function).as_str() {
            "Init" => self.init().map(|_| Vec::new()),
            "RequestLC" => self.request_lc(store, args).map(|_| Vec::new()),
            "IssueLC" => self.issue_lc(store, args).map(|_| Vec::new()),
            "AcceptLC" => self.accept_lc(store, args).map(|_| Vec::new()),
            "GetLC" => Ok(self.get_lc(store, args)?.unwrap_or_default()),
            "GetLCHistory" => self.get_lc_history(store, args).map(String::into_bytes),
            _ => Err(ContractError::UnknownFunction(function.to_string())),
        }
    }
}

// gateways send "requestLC" for "RequestLC"
fn canonical_name(function: &str) -> String {
    let mut chars = function.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
