//! # Protocol Configuration & Constants
//!
//! Every magic number in Tally lives here. Most of them are part of the
//! signature wire contract: change one and every signature ever produced
//! stops validating.

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Mainnet chain id.
pub const CHAIN_ID_MAINNET: u16 = 1;

/// Testnet chain id.
pub const CHAIN_ID_TESTNET: u16 = 2;

/// Devnet chain id. Reset whenever someone feels like it.
pub const CHAIN_ID_DEVNET: u16 = 1337;

// ---------------------------------------------------------------------------
// Account Identifiers
// ---------------------------------------------------------------------------

/// Raw account identifier width in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Hex digits in a rendered account identifier (without prefix).
pub const ADDRESS_HEX_LENGTH: usize = ADDRESS_LENGTH * 2;

/// Full rendered length: `0x` followed by 40 hex digits.
pub const ACCOUNT_ID_LENGTH: usize = ADDRESS_HEX_LENGTH + 2;

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Version byte leading the canonical transaction encoding. Bump it (and
/// keep the old encoder around) if the field layout ever changes.
pub const DIGEST_VERSION: u8 = 1;

/// Prefix stamped in front of the transaction hash before signing, so a
/// Tally signature can never be mistaken for a signature over some other
/// kind of message.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Tally Signed Message:\n32";

/// Added to the raw ECDSA recovery id (0 or 1) to produce `V`.
///
/// Ethereum uses 27; we use 29 so signatures from other secp256k1 chains
/// are rejected at the well-formedness check.
pub const RECOVERY_ID_OFFSET: u64 = 29;

/// Secp256k1 private key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Uncompressed SEC1 public key length (`0x04 || X || Y`).
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Width of each of the `R` and `S` signature scalars.
pub const SCALAR_LENGTH: usize = 32;

/// Keccak-256 output length.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns a friendly name for a chain id, mainly for logging.
pub fn network_name(chain_id: u16) -> String {
    match chain_id {
        CHAIN_ID_MAINNET => "mainnet".to_string(),
        CHAIN_ID_TESTNET => "testnet".to_string(),
        CHAIN_ID_DEVNET => "devnet".to_string(),
        other => format!("unknown({})", other),
    }
}
