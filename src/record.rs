//! Letter of credit record and the payload shapes accepted by the contract
use super::error::ContractError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum LcStatus {
    Requested,
    Issued,
    Accepted,
}

impl LcStatus {
    /// The status a well-behaved lifecycle moves to next, if any.
    pub fn next(self) -> Option<LcStatus> {
        match self {
            LcStatus::Requested => Some(LcStatus::Issued),
            LcStatus::Issued => Some(LcStatus::Accepted),
            LcStatus::Accepted => None,
        }
    }
}

impl fmt::Display for LcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LcStatus::Requested => "Requested",
            LcStatus::Issued => "Issued",
            LcStatus::Accepted => "Accepted",
        };
        f.write_str(name)
    }
}

// Field names and the integer amount are what earlier deployments persisted.
// Renaming any of them makes existing history unreadable.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct LetterOfCredit {
    #[serde(rename = "lcId")]
    id: String,
    #[serde(rename = "expiryDate")]
    expiry_date: String,
    buyer: String,
    bank: String,
    seller: String,
    amount: u64,
    status: LcStatus,
}

impl LetterOfCredit {
    /// Start a fresh record in the `Requested` state
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expiry_date: String::new(),
            buyer: String::new(),
            bank: String::new(),
            seller: String::new(),
            amount: 0,
            status: LcStatus::Requested,
        }
    }
    pub fn set_expiry_date(mut self, expiry_date: impl Into<String>) -> Self {
        self.expiry_date = expiry_date.into();
        self
    }
    pub fn set_buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = buyer.into();
        self
    }
    pub fn set_bank(mut self, bank: impl Into<String>) -> Self {
        self.bank = bank.into();
        self
    }
    pub fn set_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = seller.into();
        self
    }
    pub fn set_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn expiry_date(&self) -> &str {
        &self.expiry_date
    }
    pub fn buyer(&self) -> &str {
        &self.buyer
    }
    pub fn bank(&self) -> &str {
        &self.bank
    }
    pub fn seller(&self) -> &str {
        &self.seller
    }
    pub fn amount(&self) -> u64 {
        self.amount
    }
    pub fn status(&self) -> LcStatus {
        self.status
    }

    /// Copy of this record with only the status replaced
    pub fn with_status(&self, status: LcStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ContractError> {
        serde_json::to_vec(self).map_err(ContractError::SerializationFailure)
    }

    /// Decode a stored version. `lc_id` only labels the error.
    pub fn from_bytes(lc_id: &str, bytes: &[u8]) -> Result<Self, ContractError> {
        let record: LetterOfCredit =
            serde_json::from_slice(bytes).map_err(|err| ContractError::DeserializationFailure {
                lc_id: lc_id.to_string(),
                reason: err.to_string(),
            })?;
        if record.id.is_empty() {
            return Err(ContractError::DeserializationFailure {
                lc_id: lc_id.to_string(),
                reason: "stored record has an empty lcId".into(),
            });
        }
        Ok(record)
    }
}

/// Arguments of `RequestLC`. A `status` supplied by the caller is ignored and
/// omitted fields start out empty (amount zero).
#[derive(Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct RequestPayload {
    #[serde(rename = "lcId")]
    pub id: String,
    #[serde(rename = "expiryDate", default)]
    pub expiry_date: String,
    #[serde(default)]
    pub buyer: String,
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub amount: u64,
}

impl RequestPayload {
    pub fn parse(args: &str) -> Result<Self, ContractError> {
        let payload: RequestPayload =
            serde_json::from_str(args).map_err(|err| ContractError::MalformedInput {
                expected: "LC",
                reason: err.to_string(),
            })?;
        if payload.id.trim().is_empty() {
            return Err(ContractError::MalformedInput {
                expected: "LC",
                reason: "lcId must not be empty".into(),
            });
        }
        Ok(payload)
    }

    pub fn into_record(self) -> LetterOfCredit {
        LetterOfCredit::new(self.id)
            .set_expiry_date(self.expiry_date)
            .set_buyer(self.buyer)
            .set_bank(self.bank)
            .set_seller(self.seller)
            .set_amount(self.amount)
    }
}

/// Arguments of `IssueLC` and `AcceptLC`.
#[derive(Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct LcIdPayload {
    #[serde(rename = "lcID", alias = "lcId")]
    pub id: String,
}

impl LcIdPayload {
    pub fn parse(args: &str) -> Result<Self, ContractError> {
        let payload: LcIdPayload =
            serde_json::from_str(args).map_err(|err| ContractError::MalformedInput {
                expected: "LCID",
                reason: err.to_string(),
            })?;
        if payload.id.trim().is_empty() {
            return Err(ContractError::MalformedInput {
                expected: "LCID",
                reason: "lcID must not be empty".into(),
            });
        }
        Ok(payload)
    }
}
