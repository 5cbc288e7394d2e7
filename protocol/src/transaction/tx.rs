//! Unsigned transfer records.
//!
//! A [`Tx`] is a transfer *intent*: it names a sender and a recipient but
//! proves nothing about who authorized it. Construction checks that both
//! account identifiers are well-formed and nothing else. In particular a
//! self-transfer constructs fine; it is rejected at validation, where it
//! matters.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::identity::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural errors raised by [`Tx::new`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("from account is not properly formatted: {from:?}")]
    InvalidSender { from: String },

    #[error("to account is not properly formatted: {to:?}")]
    InvalidRecipient { to: String },
}

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// The transactional information between two parties.
///
/// Field order here is the field order of the signing digest (see
/// [`super::digest`]). Fields are private: a `Tx` is immutable once built.
/// JSON field names are `chain_id`, `nonce`, `from`, `to`, `value`, `tip`,
/// `data` (hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tx {
    /// Chain the transaction is meant for. Listed in the genesis file.
    chain_id: u16,

    /// Sender-supplied sequence number.
    nonce: u64,

    /// Account sending the transaction. Checked against the signature.
    #[serde(rename = "from")]
    from_id: AccountId,

    /// Account receiving the value.
    #[serde(rename = "to")]
    to_id: AccountId,

    /// Amount transferred.
    value: u64,

    /// Incentive offered by the sender for inclusion.
    tip: u64,

    /// Extra data attached to the transaction.
    #[serde(default, with = "hex_data")]
    data: Vec<u8>,
}

impl Tx {
    /// Constructs a new transaction.
    ///
    /// Fails with [`ConstructionError::InvalidSender`] or
    /// [`ConstructionError::InvalidRecipient`] when either id is unset or
    /// malformed.
    pub fn new(
        chain_id: u16,
        nonce: u64,
        from_id: AccountId,
        to_id: AccountId,
        value: u64,
        tip: u64,
        data: Vec<u8>,
    ) -> Result<Self, ConstructionError> {
        if !from_id.is_valid() {
            return Err(ConstructionError::InvalidSender {
                from: from_id.to_string(),
            });
        }
        if !to_id.is_valid() {
            return Err(ConstructionError::InvalidRecipient {
                to: to_id.to_string(),
            });
        }

        Ok(Self {
            chain_id,
            nonce,
            from_id,
            to_id,
            value,
            tip,
            data,
        })
    }

    pub fn chain_id(&self) -> u16 {
        self.chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn from_id(&self) -> &AccountId {
        &self.from_id
    }

    pub fn to_id(&self) -> &AccountId {
        &self.to_id
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn tip(&self) -> u64 {
        self.tip
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from_id, self.nonce)
    }
}

/// `data` travels as a hex string in JSON rather than an array of numbers.
mod hex_data {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
