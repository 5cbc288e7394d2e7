//! Lifecycle vocabulary for transfers.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TxStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a transfer.
///
/// ```text
/// Unsigned --sign--> Signed --validate ok--> Authorized --ledger transfer--> Applied
///                       \
///                        `--validate err--> Rejected
/// ```
///
/// `Applied` and `Rejected` are terminal. A ledger failure after
/// authorization (unknown sender, insufficient funds) also ends in
/// `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Constructed, not yet signed.
    Unsigned,
    /// Carries a signature that has not been checked.
    Signed,
    /// Passed validation; safe to hand to the ledger.
    Authorized,
    /// Balances moved.
    Applied,
    /// Failed validation or the ledger refused it.
    Rejected,
}

impl TxStatus {
    /// Status after running validation on a `Signed` transfer.
    pub fn after_validation<E>(result: &Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Authorized,
            Err(_) => Self::Rejected,
        }
    }

    /// Status after handing an `Authorized` transfer to the ledger.
    pub fn after_apply<E>(result: &Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(_) => Self::Rejected,
        }
    }

    /// `true` for `Applied` and `Rejected`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Applied | Self::Rejected)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TxStatus) -> bool {
        matches!(
            (self, next),
            (Self::Unsigned, Self::Signed)
                | (Self::Signed, Self::Authorized)
                | (Self::Signed, Self::Rejected)
                | (Self::Authorized, Self::Applied)
                | (Self::Authorized, Self::Rejected)
        )
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned => write!(f, "unsigned"),
            Self::Signed => write!(f, "signed"),
            Self::Authorized => write!(f, "authorized"),
            Self::Applied => write!(f, "applied"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}
