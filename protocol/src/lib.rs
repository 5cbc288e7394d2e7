// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tally Protocol Core Library
//!
//! Transaction authenticity and account identity for a small account-based
//! ledger. A sender signs a transfer with a secp256k1 key; a validator
//! recovers the signer from the signature alone and accepts the transfer
//! only if the signer owns the `from` account.
//!
//! ## Architecture
//!
//! - **crypto**: Keccak-256 and recoverable secp256k1 ECDSA, via `k256` and `sha3`.
//! - **identity**: [`AccountId`], derived from a public key or parsed from hex.
//! - **transaction**: [`Tx`], [`SignedTx`], the signing digest, and validation.
//! - **storage**: the in-memory account ledger index.
//! - **genesis**: chain id and opening balances, loaded from JSON.
//! - **config**: protocol constants.
//!
//! ## Example
//!
//! ```
//! use tally_protocol::{Database, Genesis, Keypair, Tx};
//!
//! let alice = Keypair::generate();
//! let bob = Keypair::generate();
//!
//! let genesis = Genesis::new(1).with_balance(alice.account_id().as_str(), 1_000);
//! let ledger = Database::new(genesis).unwrap();
//!
//! let tx = Tx::new(1, ledger.next_nonce(&alice.account_id()), alice.account_id(), bob.account_id(), 250, 0, vec![]).unwrap();
//! let signed = tx.sign(&alice).unwrap();
//! signed.validate(1).unwrap();
//!
//! ledger.apply(signed.tx()).unwrap();
//! assert_eq!(ledger.balance(&bob.account_id()), 250);
//! assert_eq!(ledger.next_nonce(&alice.account_id()), 2);
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod genesis;
pub mod identity;
pub mod storage;
pub mod transaction;

pub use error::{Error, Result};
pub use genesis::{Genesis, GenesisError};
pub use identity::{AccountId, AccountIdError, Keypair, PublicKey};
pub use storage::{Account, Database, LedgerError};
pub use transaction::{
    sign_transaction, validate_transaction, ConstructionError, SignedTx, SigningError, Tx,
    TxStatus, ValidationError,
};
