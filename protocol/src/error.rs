//! Crate-wide error type.
//!
//! Each module owns a precise error enum; [`Error`] folds them together for
//! callers that do not care which layer failed.

use thiserror::Error;

use crate::crypto::{KeyError, SignatureError};
use crate::genesis::GenesisError;
use crate::identity::AccountIdError;
use crate::storage::LedgerError;
use crate::transaction::{ConstructionError, SigningError, ValidationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    AccountId(#[from] AccountIdError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Genesis(#[from] GenesisError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AccountId;

    fn parse(s: &str) -> Result<AccountId> {
        Ok(AccountId::parse(s)?)
    }

    #[test]
    fn question_mark_lifts_module_errors() {
        match parse("0x12") {
            Err(Error::AccountId(AccountIdError::InvalidFormat { value })) => {
                assert_eq!(value, "0x12")
            }
            other => panic!("expected AccountId error, got {:?}", other),
        }
    }

    #[test]
    fn display_is_transparent() {
        let inner = ValidationError::ChainMismatch { got: 1, expected: 2 };
        let outer = Error::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
    }
}
