//! # Hashing Utilities
//!
//! Keccak-256 is the only hash in Tally. It derives account identifiers from
//! public keys and produces the digest that gets signed.
//!
//! Note this is the original Keccak padding, not the finalized SHA3-256
//! standard. The two produce different outputs for the same input; every
//! secp256k1 ledger that derives 20-byte addresses uses Keccak, so we do too.

use sha3::{Digest, Keccak256};

use crate::config::{HASH_OUTPUT_LENGTH, SIGNED_MESSAGE_PREFIX};

/// Compute the Keccak-256 hash of the input data.
///
/// # Example
///
/// ```
/// use tally_protocol::crypto::keccak256;
///
/// let hash = keccak256(b"tally");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn keccak256(data: &[u8]) -> [u8; HASH_OUTPUT_LENGTH] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash several slices as if they were concatenated, without allocating
/// the concatenation.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; HASH_OUTPUT_LENGTH] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Stamp a 32-byte hash with the signed-message prefix and hash again.
///
/// `stamped = Keccak256(SIGNED_MESSAGE_PREFIX || hash)`. This is the value
/// that actually goes into the ECDSA primitive.
pub fn stamp_hash(hash: &[u8; HASH_OUTPUT_LENGTH]) -> [u8; HASH_OUTPUT_LENGTH] {
    keccak256_concat(&[SIGNED_MESSAGE_PREFIX, &hash[..]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_empty_known_vector() {
        // Keccak-256(""); differs from SHA3-256("") which starts with a7ffc6f8.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak_is_deterministic() {
        assert_eq!(keccak256(b"same input"), keccak256(b"same input"));
        assert_ne!(keccak256(b"input a"), keccak256(b"input b"));
    }

    #[test]
    fn concat_matches_single_buffer() {
        let joined = keccak256(b"hello world");
        let parts = keccak256_concat(&[&b"hello"[..], &b" "[..], &b"world"[..]]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn stamp_changes_hash() {
        let h = keccak256(b"payload");
        let stamped = stamp_hash(&h);
        assert_ne!(h, stamped);
        assert_eq!(stamped, stamp_hash(&h));
    }
}
