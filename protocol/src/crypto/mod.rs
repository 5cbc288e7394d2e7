//! # Cryptographic Primitives for Tally
//!
//! Everything security-related flows through here:
//!
//! - **secp256k1 ECDSA** with public-key recovery for transaction signatures.
//! - **Keccak-256** for address derivation and signing digests.
//!
//! Everything here is a thin, typed wrapper around `k256` and `sha3`. No
//! curve arithmetic is implemented in this crate.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, stamp_hash};
pub use keys::{KeyError, Keypair, PublicKey};
pub use signatures::{recover_public_key, sign_prehash, RecoverableSignature, SignatureError};
