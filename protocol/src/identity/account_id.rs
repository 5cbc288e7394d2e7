//! # Account Identifiers
//!
//! An [`AccountId`] is the textual identity of a ledger participant: a
//! 20-byte value rendered as `0x` followed by 40 hex digits. It is derived
//! from a secp256k1 public key:
//!
//! ```text
//! public_key (65 bytes, uncompressed SEC1)
//!     -> Keccak256(public_key[1..]) -> 32 bytes
//!     -> last 20 bytes
//!     -> EIP-55 checksummed hex -> 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
//! ```
//!
//! Parsing is case-insensitive but always produces the checksummed
//! rendering, so two ids for the same 20 bytes compare equal as strings no
//! matter how the caller typed them. The empty id is the "unset" value; it
//! can be constructed but never passes [`AccountId::is_valid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ACCOUNT_ID_LENGTH, ADDRESS_HEX_LENGTH, ADDRESS_LENGTH};
use crate::crypto::hash::keccak256;
use crate::crypto::keys::PublicKey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when parsing an account identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    /// Not `0x` + 40 hex digits (prefix optional, either case).
    #[error("invalid account format: {value:?}")]
    InvalidFormat {
        /// The rejected input.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reports whether `s` is a well-formed account identifier.
///
/// Accepts an optional `0x`/`0X` prefix followed by exactly 40 hex digits
/// in any case. Total: never panics, never allocates.
pub fn is_valid(s: &str) -> bool {
    let digits = strip_hex_prefix(s);
    digits.len() == ADDRESS_HEX_LENGTH
        && digits.len() % 2 == 0
        && digits.bytes().all(|c| c.is_ascii_hexdigit())
}

fn strip_hex_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X') {
        &s[2..]
    } else {
        s
    }
}

/// EIP-55 mixed-case rendering: a hex letter is uppercased when the
/// matching nibble of `Keccak256(lowercase_hex)` is 8 or more.
fn to_checksum_hex(bytes: &[u8; ADDRESS_LENGTH]) -> String {
    let lower = hex::encode(bytes);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(ACCOUNT_ID_LENGTH);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A validated, immutable account identifier.
///
/// # Examples
///
/// ```
/// use tally_protocol::identity::AccountId;
///
/// let id = AccountId::parse("0X5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
/// assert_eq!(id.as_str(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
/// assert!(id.is_valid());
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parse a caller-supplied identifier.
    ///
    /// The empty string yields the empty (unset) id. Anything else must
    /// pass [`is_valid`] and comes back in checksummed form.
    pub fn parse(s: &str) -> Result<Self, AccountIdError> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        if !is_valid(s) {
            return Err(AccountIdError::InvalidFormat {
                value: s.to_string(),
            });
        }

        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(strip_hex_prefix(s), &mut bytes).map_err(|_| {
            AccountIdError::InvalidFormat {
                value: s.to_string(),
            }
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Render a raw 20-byte value.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(to_checksum_hex(&bytes))
    }

    /// Derive the identifier owned by `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let encoded = public_key.to_uncompressed_bytes();
        let hash = keccak256(&encoded[1..]);

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash[hash.len() - ADDRESS_LENGTH..]);
        Self::from_bytes(bytes)
    }

    /// The raw 20 bytes, or `None` for the empty id.
    pub fn to_bytes(&self) -> Option<[u8; ADDRESS_LENGTH]> {
        if !self.is_valid() {
            return None;
        }
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(strip_hex_prefix(&self.0), &mut bytes).ok()?;
        Some(bytes)
    }

    /// `false` only for the empty id (or one smuggled past the parser).
    pub fn is_valid(&self) -> bool {
        is_valid(&self.0)
    }

    /// `true` for the unset id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
