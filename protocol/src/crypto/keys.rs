//! # Key Management
//!
//! Secp256k1 keypair generation and serialization for Tally identities.
//!
//! Every participant has one ECDSA keypair over secp256k1. The curve was
//! picked for public-key *recovery*: a validator recovers the signer's
//! public key from the signature and the digest, so transactions never need
//! to carry the key itself.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (`k256::ecdsa::SigningKey` does it).
//! - Key generation uses `OsRng`.
//! - Key bytes are never logged. `Debug` prints the public half only.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use crate::identity::AccountId;

/// Errors that can occur during key operations.
///
/// Deliberately vague about why key material was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid secp256k1 point")]
    InvalidPublicKey,
}

/// A Tally identity keypair wrapping a secp256k1 signing key.
///
/// `Keypair` does not implement `Serialize`. Exporting a private key should
/// be a deliberate call to [`Keypair::secret_key_hex`], not a side effect of
/// dumping a struct to JSON.
///
/// # Examples
///
/// ```
/// use tally_protocol::crypto::keys::Keypair;
///
/// let kp = Keypair::generate();
/// let id = kp.account_id();
/// assert_eq!(id.as_str().len(), 42);
/// ```
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

/// The public half of a keypair.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key: VerifyingKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a raw 32-byte big-endian scalar.
    ///
    /// Fails for zero and for values at or above the curve order.
    pub fn from_bytes(secret_key_bytes: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(secret_key_bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded secret key. A `0x` prefix
    /// is accepted.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str
            .strip_prefix("0x")
            .or_else(|| hex_str.strip_prefix("0X"))
            .unwrap_or(hex_str);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&arr)
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: self.signing_key.verifying_key().clone(),
        }
    }

    /// The account identifier this keypair signs for.
    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(&self.public_key())
    }

    /// Exports the raw 32-byte secret scalar.
    ///
    /// **Handle with care.** Whoever holds these bytes controls the account.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes().into()
    }

    /// Hex-encoded secret key, no prefix.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair(account={})", self.account_id())
    }
}

impl PartialEq for Keypair {
    /// Compares public halves only.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for Keypair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Parse a SEC1-encoded point (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    /// Parse a hex-encoded SEC1 point.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Uncompressed SEC1 encoding: `0x04 || X || Y`.
    pub fn to_uncompressed_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let point = self.key.as_affine().to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Hex of the uncompressed encoding. 130 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_uncompressed_bytes())
    }

    pub(crate) fn from_verifying_key(key: VerifyingKey) -> Self {
        Self { key }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..18])
    }
}
