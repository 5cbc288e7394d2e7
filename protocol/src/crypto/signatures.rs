//! # Recoverable ECDSA Signatures
//!
//! Thin wrapper over the `k256` sign/recover primitives. Everything that
//! signs or recovers in Tally goes through [`sign_prehash`] and
//! [`recover_public_key`], which gives a single place to audit.
//!
//! A [`RecoverableSignature`] is the raw `(recovery_id, r, s)` triple. The
//! transaction layer turns it into the `V`/`R`/`S` wire form.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use thiserror::Error;

use super::keys::{Keypair, PublicKey};
use crate::config::SCALAR_LENGTH;

/// Errors from the underlying curve primitive.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing primitive failed: {0}")]
    SigningFailed(String),

    #[error("recovery id must be 0 or 1, got {0}")]
    InvalidRecoveryId(u8),

    #[error("signature scalars are not a valid secp256k1 signature")]
    InvalidScalars,

    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Raw recoverable signature. `s` is always in the lower half of the group
/// order when produced by [`sign_prehash`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub recovery_id: u8,
    pub r: [u8; SCALAR_LENGTH],
    pub s: [u8; SCALAR_LENGTH],
}

/// Sign a 32-byte digest.
///
/// The digest is signed as-is (RFC 6979 deterministic nonce); it must
/// already be the output of a hash.
pub fn sign_prehash(
    keypair: &Keypair,
    digest: &[u8; 32],
) -> Result<RecoverableSignature, SignatureError> {
    let (signature, recovery_id): (Signature, RecoveryId) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;

    // Keep s in the lower half; negating s flips the parity of R's y.
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(low) => (low, recovery_id.to_byte() ^ 1),
        None => (signature, recovery_id.to_byte()),
    };

    let bytes = signature.to_bytes();
    let mut r = [0u8; SCALAR_LENGTH];
    let mut s = [0u8; SCALAR_LENGTH];
    r.copy_from_slice(&bytes[..SCALAR_LENGTH]);
    s.copy_from_slice(&bytes[SCALAR_LENGTH..]);

    Ok(RecoverableSignature { recovery_id, r, s })
}

/// Recover the public key that produced `signature` over `digest`.
pub fn recover_public_key(
    digest: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<PublicKey, SignatureError> {
    let recovery_id = RecoveryId::from_byte(signature.recovery_id)
        .filter(|id| !id.is_x_reduced())
        .ok_or(SignatureError::InvalidRecoveryId(signature.recovery_id))?;

    let mut raw = [0u8; SCALAR_LENGTH * 2];
    raw[..SCALAR_LENGTH].copy_from_slice(&signature.r);
    raw[SCALAR_LENGTH..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&raw).map_err(|_| SignatureError::InvalidScalars)?;

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(PublicKey::from_verifying_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;
    use k256::elliptic_curve::scalar::IsHigh;

    /// secp256k1 group order `n`.
    const ORDER_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn sign_then_recover_yields_signer() {
        let kp = Keypair::generate();
        let digest = keccak256(b"send 100 to bob");
        let sig = sign_prehash(&kp, &digest).unwrap();
        let recovered = recover_public_key(&digest, &sig).unwrap();
        assert_eq!(recovered, kp.public_key());
    }

    #[test]
    fn signatures_are_low_s() {
        let kp = Keypair::generate();
        for i in 0..32u8 {
            let digest = keccak256(&[i]);
            let sig = sign_prehash(&kp, &digest).unwrap();
            let parsed = Signature::from_scalars(sig.r, sig.s).unwrap();
            assert!(!bool::from(parsed.s().is_high()));
            assert!(sig.recovery_id <= 1);
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = Keypair::generate();
        let digest = keccak256(b"rfc6979");
        assert_eq!(
            sign_prehash(&kp, &digest).unwrap(),
            sign_prehash(&kp, &digest).unwrap()
        );
    }

    #[test]
    fn different_digest_recovers_different_key() {
        let kp = Keypair::generate();
        let sig = sign_prehash(&kp, &keccak256(b"original")).unwrap();
        if let Ok(pk) = recover_public_key(&keccak256(b"tampered"), &sig) {
            assert_ne!(pk, kp.public_key());
        }
    }

    #[test]
    fn rejects_out_of_range_recovery_id() {
        let kp = Keypair::generate();
        let digest = keccak256(b"x");
        let mut sig = sign_prehash(&kp, &digest).unwrap();
        sig.recovery_id = 7;
        assert_eq!(
            recover_public_key(&digest, &sig).unwrap_err(),
            SignatureError::InvalidRecoveryId(7)
        );
    }

    #[test]
    fn rejects_zero_and_out_of_range_scalars() {
        let kp = Keypair::generate();
        let digest = keccak256(b"range");
        let good = sign_prehash(&kp, &digest).unwrap();

        let mut order = [0u8; SCALAR_LENGTH];
        hex::decode_to_slice(ORDER_HEX, &mut order).unwrap();

        for (r, s) in [
            ([0u8; SCALAR_LENGTH], good.s),
            (good.r, [0u8; SCALAR_LENGTH]),
            (order, good.s),
            (good.r, order),
        ] {
            let sig = RecoverableSignature { r, s, ..good.clone() };
            assert_eq!(
                recover_public_key(&digest, &sig).unwrap_err(),
                SignatureError::InvalidScalars
            );
        }
    }
}
