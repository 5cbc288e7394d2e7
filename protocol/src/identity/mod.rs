//! # Identity Module
//!
//! Every participant on a Tally ledger is identified by a secp256k1
//! keypair, from which we derive a 20-byte [`AccountId`] rendered as
//! checksummed hex.
//!
//! The identity stack is layered:
//!
//! 1. **Keypair**: raw secp256k1 key material. Signs transactions.
//! 2. **AccountId**: `0x` + 40 hex digits, the last 20 bytes of the
//!    Keccak-256 hash of the public key. This is what users paste into
//!    transfer forms and what the ledger index is keyed by.
//!
//! Identifiers are validated once, at the boundary (parse or derive), and
//! treated as trusted afterwards.

pub mod account_id;

pub use crate::crypto::keys::{Keypair, PublicKey};
pub use account_id::{is_valid, AccountId, AccountIdError};
