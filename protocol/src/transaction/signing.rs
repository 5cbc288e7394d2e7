//! Transaction signing with secp256k1 keypairs.
//!
//! Signing is a separate step from construction because the key may not be
//! available when the transfer is assembled. The signed data is the
//! canonical [`Tx::digest`]; the result carries the signature in the
//! `V`/`R`/`S` form used on the wire:
//!
//! - `v` = recovery id + [`RECOVERY_ID_OFFSET`], so always 29 or 30.
//! - `r`, `s` = `0x` + 64 hex digits each, `s` in the lower half of the
//!   curve order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::trace;

use super::tx::Tx;
use crate::config::{RECOVERY_ID_OFFSET, SECRET_KEY_LENGTH};
use crate::crypto::keys::{KeyError, Keypair};
use crate::crypto::signatures::{sign_prehash, RecoverableSignature, SignatureError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while producing a [`SignedTx`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The supplied secret is not a usable secp256k1 key.
    #[error("invalid signing key: {0}")]
    InvalidKey(#[from] KeyError),

    /// The curve primitive refused to sign.
    #[error("signing failed: {0}")]
    Primitive(#[from] SignatureError),
}

// ---------------------------------------------------------------------------
// SignedTx
// ---------------------------------------------------------------------------

/// A [`Tx`] plus the sender's recoverable signature.
///
/// Serializes as the flat `Tx` object with `v`, `r`, `s` alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    #[serde(flatten)]
    tx: Tx,

    /// Recovery id plus [`RECOVERY_ID_OFFSET`].
    v: u64,

    /// First signature scalar as `0x`-prefixed hex.
    r: String,

    /// Second signature scalar as `0x`-prefixed hex.
    s: String,
}

impl SignedTx {
    /// Reassemble a signed transaction from parts received elsewhere, for
    /// example from an external signer. Nothing is checked here; call
    /// [`SignedTx::validate`] before trusting the result.
    pub fn from_parts(tx: Tx, v: u64, r: impl Into<String>, s: impl Into<String>) -> Self {
        Self {
            tx,
            v,
            r: r.into(),
            s: s.into(),
        }
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    pub fn into_tx(self) -> Tx {
        self.tx
    }

    pub fn v(&self) -> u64 {
        self.v
    }

    pub fn r(&self) -> &str {
        &self.r
    }

    pub fn s(&self) -> &str {
        &self.s
    }

    /// Compact `0x` + `r` + `s` + `v` rendering: 64 + 64 + 2 hex digits.
    pub fn signature_string(&self) -> String {
        format!(
            "0x{}{}{:02x}",
            strip_hex_prefix(&self.r),
            strip_hex_prefix(&self.s),
            self.v
        )
    }

    fn from_signature(tx: Tx, signature: RecoverableSignature) -> Self {
        Self {
            tx,
            v: u64::from(signature.recovery_id) + RECOVERY_ID_OFFSET,
            r: format!("0x{}", hex::encode(signature.r)),
            s: format!("0x{}", hex::encode(signature.s)),
        }
    }
}

impl fmt::Display for SignedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tx, f)
    }
}

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

impl Tx {
    /// Sign this transaction.
    ///
    /// Nothing about the transaction is checked: a keypair that does not
    /// own `from` still produces a signature, which validation later
    /// rejects with [`SignatureMismatch`](super::ValidationError::SignatureMismatch).
    pub fn sign(&self, keypair: &Keypair) -> Result<SignedTx, SigningError> {
        let digest = self.digest();
        let signature = sign_prehash(keypair, &digest)?;
        trace!(tx = %self, signer = %keypair.account_id(), "signed transaction");
        Ok(SignedTx::from_signature(self.clone(), signature))
    }
}

/// Signs `tx` with `keypair`.
///
/// # Example
///
/// ```rust
/// use tally_protocol::identity::Keypair;
/// use tally_protocol::transaction::{sign_transaction, Tx};
///
/// let sender = Keypair::generate();
/// let recipient = Keypair::generate();
/// let tx = Tx::new(1, 1, sender.account_id(), recipient.account_id(), 100, 1, vec![]).unwrap();
///
/// let signed = sign_transaction(&tx, &sender).unwrap();
/// assert!(signed.validate(1).is_ok());
/// ```
pub fn sign_transaction(tx: &Tx, keypair: &Keypair) -> Result<SignedTx, SigningError> {
    tx.sign(keypair)
}

/// Signs `tx` with a raw 32-byte secret key.
pub fn sign_with_secret(tx: &Tx, secret: &[u8; SECRET_KEY_LENGTH]) -> Result<SignedTx, SigningError> {
    let keypair = Keypair::from_bytes(secret)?;
    tx.sign(&keypair)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
