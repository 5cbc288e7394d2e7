//! Transaction validation: structural checks and signature recovery.
//!
//! Every signed transaction must pass [`SignedTx::validate`] before it is
//! allowed to touch balances. The checks run cheapest first, and the first
//! failure is the one reported. Validation is a pure function of the
//! transaction and the expected chain id; it never consults the ledger.

use k256::ecdsa::Signature;
use k256::elliptic_curve::scalar::IsHigh;
use thiserror::Error;
use tracing::debug;

use super::signing::{strip_hex_prefix, SignedTx};
use crate::config::{RECOVERY_ID_OFFSET, SCALAR_LENGTH};
use crate::crypto::signatures::{recover_public_key, RecoverableSignature};
use crate::identity::AccountId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a signed transaction is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Signed for a different chain.
    #[error("invalid chain id, got[{got}] exp[{expected}]")]
    ChainMismatch { got: u16, expected: u16 },

    /// The `from` field is not a well-formed account id.
    #[error("from account is not properly formatted: {from:?}")]
    InvalidSender { from: String },

    /// The `to` field is not a well-formed account id.
    #[error("to account is not properly formatted: {to:?}")]
    InvalidRecipient { to: String },

    /// Sender and recipient are the same account.
    #[error("transaction invalid, sending money to yourself, from {address}, to {address}")]
    SelfTransfer { address: String },

    /// `v`, `r` or `s` is out of range or undecodable.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    /// The signature is valid but was produced by someone other than `from`.
    #[error("signature address doesn't match from address, claimed {claimed}, signed by {recovered}")]
    SignatureMismatch { claimed: String, recovered: String },
}

impl ValidationError {
    /// Short stable label, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChainMismatch { .. } => "chain_mismatch",
            Self::InvalidSender { .. } => "invalid_sender",
            Self::InvalidRecipient { .. } => "invalid_recipient",
            Self::SelfTransfer { .. } => "self_transfer",
            Self::MalformedSignature { .. } => "malformed_signature",
            Self::SignatureMismatch { .. } => "signature_mismatch",
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSignature {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl SignedTx {
    /// Checks the transaction for acceptance on chain `chain_id`.
    ///
    /// The checks, in order:
    ///
    /// 1. **Chain id** must equal `chain_id`.
    /// 2. **From** must be a well-formed account id.
    /// 3. **To** must be a well-formed account id.
    /// 4. **Self-transfer**: from and to must differ.
    /// 5. **Signature shape**: `v` in {29, 30}, `r` and `s` decode to 32
    ///    bytes, `1 <= r < n`, `1 <= s <= n/2`.
    /// 6. **Recovery**: the signer recovered from the digest must be `from`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`ValidationError`].
    pub fn validate(&self, chain_id: u16) -> Result<(), ValidationError> {
        let result = self.run_checks(chain_id);
        if let Err(err) = &result {
            debug!(tx = %self, kind = err.kind(), error = %err, "transaction rejected");
        }
        result
    }

    /// Recovers the account that produced the signature, without comparing
    /// it to `from`.
    pub fn recover_sender(&self) -> Result<AccountId, ValidationError> {
        let signature = self.decode_signature()?;
        let public_key = recover_public_key(&self.tx().digest(), &signature)
            .map_err(|e| ValidationError::malformed(e.to_string()))?;
        Ok(AccountId::from_public_key(&public_key))
    }

    fn run_checks(&self, chain_id: u16) -> Result<(), ValidationError> {
        let tx = self.tx();

        // 1. Chain id.
        if tx.chain_id() != chain_id {
            return Err(ValidationError::ChainMismatch {
                got: tx.chain_id(),
                expected: chain_id,
            });
        }

        // 2. Sender format.
        if !tx.from_id().is_valid() {
            return Err(ValidationError::InvalidSender {
                from: tx.from_id().to_string(),
            });
        }

        // 3. Recipient format.
        if !tx.to_id().is_valid() {
            return Err(ValidationError::InvalidRecipient {
                to: tx.to_id().to_string(),
            });
        }

        // 4. Self-transfer. Ids are canonical, so textual equality is
        //    byte equality.
        if tx.from_id() == tx.to_id() {
            return Err(ValidationError::SelfTransfer {
                address: tx.from_id().to_string(),
            });
        }

        // 5 + 6. Signature shape, then recovery.
        let recovered = self.recover_sender()?;
        if &recovered != tx.from_id() {
            return Err(ValidationError::SignatureMismatch {
                claimed: tx.from_id().to_string(),
                recovered: recovered.to_string(),
            });
        }

        Ok(())
    }

    fn decode_signature(&self) -> Result<RecoverableSignature, ValidationError> {
        let recovery_id = self
            .v()
            .checked_sub(RECOVERY_ID_OFFSET)
            .filter(|id| *id <= 1)
            .ok_or_else(|| ValidationError::malformed(format!("invalid recovery id: v = {}", self.v())))?;

        let r = decode_scalar("r", self.r())?;
        let s = decode_scalar("s", self.s())?;

        // Both scalars must lie in [1, n).
        let signature = Signature::from_scalars(r, s)
            .map_err(|_| ValidationError::malformed("r or s is out of range"))?;
        if bool::from(signature.s().is_high()) {
            return Err(ValidationError::malformed("s is in the upper half of the curve order"));
        }

        Ok(RecoverableSignature {
            recovery_id: recovery_id as u8,
            r,
            s,
        })
    }
}

fn decode_scalar(name: &str, value: &str) -> Result<[u8; SCALAR_LENGTH], ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::malformed(format!("{} is missing", name)));
    }
    let digits = strip_hex_prefix(value);
    if digits.len() != SCALAR_LENGTH * 2 {
        return Err(ValidationError::malformed(format!(
            "{} must be {} hex digits, got {}",
            name,
            SCALAR_LENGTH * 2,
            digits.len()
        )));
    }
    let mut out = [0u8; SCALAR_LENGTH];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|e| ValidationError::malformed(format!("{} is not hex: {}", name, e)))?;
    Ok(out)
}

/// Validates `signed` against `chain_id`. See [`SignedTx::validate`].
pub fn validate_transaction(signed: &SignedTx, chain_id: u16) -> Result<(), ValidationError> {
    signed.validate(chain_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Keypair;
    use crate::transaction::Tx;

    /// secp256k1 group order `n`.
    const ORDER_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn signed_transfer(chain_id: u16) -> (Keypair, SignedTx) {
        let kp = Keypair::generate();
        let to = Keypair::generate().account_id();
        let tx = Tx::new(chain_id, 1, kp.account_id(), to, 100, 1, vec![]).unwrap();
        let signed = tx.sign(&kp).unwrap();
        (kp, signed)
    }

    fn with_signature(signed: &SignedTx, v: u64, r: &str, s: &str) -> SignedTx {
        SignedTx::from_parts(signed.tx().clone(), v, r, s)
    }

    #[test]
    fn valid_transaction_passes() {
        let (_, signed) = signed_transfer(1);
        assert!(signed.validate(1).is_ok());
        assert!(validate_transaction(&signed, 1).is_ok());
    }

    #[test]
    fn recover_sender_returns_signer() {
        let (kp, signed) = signed_transfer(1);
        assert_eq!(signed.recover_sender().unwrap(), kp.account_id());
    }

    #[test]
    fn chain_mismatch() {
        let (_, signed) = signed_transfer(1);
        match signed.validate(2) {
            Err(ValidationError::ChainMismatch { got, expected }) => {
                assert_eq!(got, 1);
                assert_eq!(expected, 2);
            }
            other => panic!("expected ChainMismatch, got {:?}", other),
        }
    }

    #[test]
    fn chain_checked_before_everything_else() {
        let kp = Keypair::generate();
        let tx = Tx::new(3, 1, kp.account_id(), kp.account_id(), 1, 0, vec![]).unwrap();
        let bogus = SignedTx::from_parts(tx, 0, "", "");
        match bogus.validate(1) {
            Err(ValidationError::ChainMismatch { .. }) => {}
            other => panic!("expected ChainMismatch, got {:?}", other),
        }
    }

    #[test]
    fn unset_sender_rejected() {
        let (_, signed) = signed_transfer(1);
        let json = serde_json::to_value(&signed).unwrap();
        let mut json = json.as_object().unwrap().clone();
        json.insert("from".into(), serde_json::Value::String(String::new()));
        let tampered: SignedTx = serde_json::from_value(json.into()).unwrap();

        match tampered.validate(1) {
            Err(ValidationError::InvalidSender { .. }) => {}
            other => panic!("expected InvalidSender, got {:?}", other),
        }
    }

    #[test]
    fn unset_recipient_rejected() {
        let (_, signed) = signed_transfer(1);
        let mut json = serde_json::to_value(&signed).unwrap();
        json["to"] = serde_json::Value::String(String::new());
        let tampered: SignedTx = serde_json::from_value(json).unwrap();

        match tampered.validate(1) {
            Err(ValidationError::InvalidRecipient { .. }) => {}
            other => panic!("expected InvalidRecipient, got {:?}", other),
        }
    }

    #[test]
    fn self_transfer_rejected() {
        let kp = Keypair::generate();
        let tx = Tx::new(1, 1, kp.account_id(), kp.account_id(), 10, 0, vec![]).unwrap();
        let signed = tx.sign(&kp).unwrap();

        match signed.validate(1) {
            Err(ValidationError::SelfTransfer { address }) => {
                assert_eq!(address, kp.account_id().to_string());
            }
            other => panic!("expected SelfTransfer, got {:?}", other),
        }
    }

    #[test]
    fn foreign_signer_rejected() {
        let owner = Keypair::generate();
        let stranger = Keypair::generate();
        let to = Keypair::generate().account_id();
        let tx = Tx::new(1, 1, owner.account_id(), to, 10, 0, vec![]).unwrap();
        let signed = tx.sign(&stranger).unwrap();

        match signed.validate(1) {
            Err(ValidationError::SignatureMismatch { claimed, recovered }) => {
                assert_eq!(claimed, owner.account_id().to_string());
                assert_eq!(recovered, stranger.account_id().to_string());
            }
            other => panic!("expected SignatureMismatch, got {:?}", other),
        }
    }

    #[test]
    fn tampered_value_rejected() {
        let (kp, signed) = signed_transfer(1);
        let original = signed.tx();
        let tampered_tx = Tx::new(
            original.chain_id(),
            original.nonce(),
            original.from_id().clone(),
            original.to_id().clone(),
            original.value() + 1,
            original.tip(),
            original.data().to_vec(),
        )
        .unwrap();
        let tampered = SignedTx::from_parts(tampered_tx, signed.v(), signed.r(), signed.s());

        match tampered.validate(1) {
            Err(ValidationError::SignatureMismatch { claimed, recovered }) => {
                assert_eq!(claimed, kp.account_id().to_string());
                assert_ne!(recovered, claimed);
            }
            other => panic!("expected SignatureMismatch, got {:?}", other),
        }
    }

    #[test]
    fn v_out_of_range_is_malformed() {
        let (_, signed) = signed_transfer(1);
        for v in [0, 1, 27, 28, 31, u64::MAX] {
            let bad = with_signature(&signed, v, signed.r(), signed.s());
            match bad.validate(1) {
                Err(ValidationError::MalformedSignature { .. }) => {}
                other => panic!("v = {}: expected MalformedSignature, got {:?}", v, other),
            }
        }
    }

    #[test]
    fn missing_or_short_scalars_are_malformed() {
        let (_, signed) = signed_transfer(1);
        let cases = [
            ("", signed.s().to_string()),
            (signed.r(), String::new()),
            ("0x1234", signed.s().to_string()),
            (signed.r(), format!("{}00", signed.s())),
        ];
        for (r, s) in cases {
            let bad = with_signature(&signed, signed.v(), r, &s);
            match bad.validate(1) {
                Err(ValidationError::MalformedSignature { .. }) => {}
                other => panic!("expected MalformedSignature, got {:?}", other),
            }
        }
    }

    #[test]
    fn zero_and_order_scalars_are_malformed() {
        let (_, signed) = signed_transfer(1);
        let zero = format!("0x{}", "00".repeat(32));
        let order = format!("0x{}", ORDER_HEX);

        for (r, s) in [
            (zero.as_str(), signed.s()),
            (signed.r(), zero.as_str()),
            (order.as_str(), signed.s()),
            (signed.r(), order.as_str()),
        ] {
            let bad = with_signature(&signed, signed.v(), r, s);
            match bad.validate(1) {
                Err(ValidationError::MalformedSignature { .. }) => {}
                other => panic!("expected MalformedSignature, got {:?}", other),
            }
        }
    }

    #[test]
    fn high_s_is_malformed() {
        let (_, signed) = signed_transfer(1);
        let low = Signature::from_scalars(
            decode_scalar("r", signed.r()).unwrap(),
            decode_scalar("s", signed.s()).unwrap(),
        )
        .unwrap();

        // (r, n - s) with the flipped recovery id is the malleated twin.
        let high: k256::Scalar = -*low.s();
        let flipped = if signed.v() == 29 { 30 } else { 29 };
        let bad = with_signature(
            &signed,
            flipped,
            signed.r(),
            &format!("0x{}", hex::encode(high.to_bytes())),
        );

        match bad.validate(1) {
            Err(ValidationError::MalformedSignature { reason }) => {
                assert!(reason.contains("upper half"), "{}", reason);
            }
            other => panic!("expected MalformedSignature, got {:?}", other),
        }
    }

    #[test]
    fn uppercase_prefix_on_scalars_accepted() {
        let (_, signed) = signed_transfer(1);
        let r = format!("0X{}", &signed.r()[2..]);
        let s = format!("0X{}", &signed.s()[2..]);
        assert!(with_signature(&signed, signed.v(), &r, &s).validate(1).is_ok());
    }

    #[test]
    fn flipped_recovery_id_rejected() {
        let (_, signed) = signed_transfer(1);
        let flipped = if signed.v() == 29 { 30 } else { 29 };
        let bad = with_signature(&signed, flipped, signed.r(), signed.s());
        assert!(bad.validate(1).is_err());
    }

    #[test]
    fn error_kinds_are_stable() {
        let err = ValidationError::ChainMismatch { got: 2, expected: 1 };
        assert_eq!(err.kind(), "chain_mismatch");
        assert_eq!(err.to_string(), "invalid chain id, got[2] exp[1]");
    }
}
