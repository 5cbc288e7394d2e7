//! Canonical signing digest.
//!
//! The bytes a sender signs are a fixed-layout binary encoding of every
//! [`Tx`] field, versioned so the layout can change without old signatures
//! silently verifying against new meaning:
//!
//! ```text
//! version   u8        (currently 1)
//! chain_id  u16 BE
//! nonce     u64 BE
//! from      20 bytes
//! to        20 bytes
//! value     u64 BE
//! tip       u64 BE
//! data_len  u64 BE
//! data      data_len bytes
//! ```
//!
//! The digest is then `Keccak256(prefix || Keccak256(encoding))`, where the
//! prefix is [`SIGNED_MESSAGE_PREFIX`](crate::config::SIGNED_MESSAGE_PREFIX). The stamp keeps a transaction
//! signature from ever doubling as a signature over some other 32-byte
//! message.

use super::tx::Tx;
use crate::config::{ADDRESS_LENGTH, DIGEST_VERSION};
use crate::crypto::hash::{keccak256, stamp_hash};

/// Fixed part of the encoding, excluding `data`.
const HEADER_LENGTH: usize = 1 + 2 + 8 + ADDRESS_LENGTH * 2 + 8 + 8 + 8;

/// Canonical byte encoding of `tx`.
///
/// Only defined for transactions whose ids are set; an unset id encodes as
/// twenty zero bytes. Validation rejects unset ids before a digest is ever
/// computed.
pub fn signable_bytes(tx: &Tx) -> Vec<u8> {
    let data = tx.data();
    let mut buf = Vec::with_capacity(HEADER_LENGTH + data.len());

    buf.push(DIGEST_VERSION);
    buf.extend_from_slice(&tx.chain_id().to_be_bytes());
    buf.extend_from_slice(&tx.nonce().to_be_bytes());
    buf.extend_from_slice(&tx.from_id().to_bytes().unwrap_or([0u8; ADDRESS_LENGTH]));
    buf.extend_from_slice(&tx.to_id().to_bytes().unwrap_or([0u8; ADDRESS_LENGTH]));
    buf.extend_from_slice(&tx.value().to_be_bytes());
    buf.extend_from_slice(&tx.tip().to_be_bytes());
    buf.extend_from_slice(&(data.len() as u64).to_be_bytes());
    buf.extend_from_slice(data);

    buf
}

/// `Keccak256` of the canonical encoding. Identifies the transaction.
pub fn tx_hash(tx: &Tx) -> [u8; 32] {
    keccak256(&signable_bytes(tx))
}

/// The 32-byte value that is actually signed and recovered against.
pub fn signing_digest(tx: &Tx) -> [u8; 32] {
    stamp_hash(&tx_hash(tx))
}

impl Tx {
    /// Shorthand for [`signing_digest`].
    pub fn digest(&self) -> [u8; 32] {
        signing_digest(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
