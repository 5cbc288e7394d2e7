//! # Transaction Module
//!
//! Construction, signing, and validation of value transfers between
//! accounts.
//!
//! ## Architecture
//!
//! ```text
//! tx.rs             Tx, the unsigned transfer record
//! digest.rs         Canonical encoding and the Keccak-256 signing digest
//! signing.rs        SignedTx and secp256k1 signing
//! verification.rs   Ordered validation and signer recovery
//! types.rs          TxStatus lifecycle
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`Tx::new`] checks that both account ids are well-formed.
//! 2. **Sign**: [`Tx::sign`] produces a [`SignedTx`] carrying `v`, `r`, `s`.
//! 3. **Validate**: [`SignedTx::validate`] checks chain id, ids,
//!    self-transfer, and that the recovered signer is `from`.
//! 4. **Apply**: the ledger moves balances (see [`crate::storage`]).
//!
//! ## Design Decisions
//!
//! - The sender is proven by public-key recovery, not by a key carried in
//!   the transaction. No public key ever travels on the wire.
//! - All amounts are `u64` in the smallest denomination.
//! - Validation never reads ledger state: nonces and balances are the
//!   ledger's concern.

pub mod digest;
pub mod signing;
pub mod tx;
pub mod types;
pub mod verification;

pub use digest::{signable_bytes, signing_digest, tx_hash};
pub use signing::{sign_transaction, sign_with_secret, SignedTx, SigningError};
pub use tx::{ConstructionError, Tx};
pub use types::TxStatus;
pub use verification::{validate_transaction, ValidationError};
