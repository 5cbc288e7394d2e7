//! # Account Ledger Index
//!
//! In-memory map from [`AccountId`] to [`Account`], seeded from the
//! genesis balances and guarded by a single `parking_lot::RwLock`. Reads
//! take the shared guard; every mutation takes the exclusive guard for its
//! whole duration, so a [`Database::transfer`] is observed all or nothing.
//!
//! ## State Transitions
//!
//! A transfer `from -> to` of `amount`:
//!
//! 1. `from` must exist.
//! 2. `from.balance >= amount`.
//! 3. `to.balance + amount` must not overflow.
//! 4. `from.balance -= amount`
//! 5. `to.balance += amount` (creating `to` if needed)
//!
//! [`Database::apply`] runs the same steps for a validated transaction,
//! first checking that its nonce is the sender's next one and finally
//! advancing that nonce, all under one guard.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::genesis::Genesis;
use crate::identity::AccountId;
use crate::transaction::Tx;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by ledger mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account {account} does not exist")]
    UnknownAccount { account: String },

    #[error("account {account} has balance {balance}, needs {required}")]
    InsufficientFunds {
        account: String,
        balance: u64,
        required: u64,
    },

    #[error("crediting {amount} to {account} overflows its balance")]
    BalanceOverflow { account: String, amount: u64 },

    #[error("genesis balance key is not a valid account: {value:?}")]
    InvalidGenesisAccount { value: String },

    #[error("genesis lists account {account} more than once")]
    DuplicateGenesisAccount { account: String },

    #[error("nonce {got} out of order for {account}, expected {expected}")]
    NonceMismatch {
        account: String,
        expected: u64,
        got: u64,
    },
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// State of a single account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    /// Nonce of the last transaction applied for this account.
    pub nonce: u64,
    pub balance: u64,
}

impl Account {
    /// Fresh account with the given opening balance.
    pub fn new(account_id: AccountId, balance: u64) -> Self {
        Self {
            account_id,
            nonce: 0,
            balance,
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// The ledger index. Share it across threads behind an `Arc`.
pub struct Database {
    genesis: Genesis,
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl Database {
    /// Seeds one account per genesis balance.
    ///
    /// Keys are compared after canonicalisation, so two spellings of the
    /// same account are rejected rather than one silently replacing the
    /// other.
    pub fn new(genesis: Genesis) -> Result<Self, LedgerError> {
        let mut accounts = HashMap::with_capacity(genesis.balances.len());
        for (raw, balance) in &genesis.balances {
            let account_id = AccountId::parse(raw)
                .ok()
                .filter(AccountId::is_valid)
                .ok_or_else(|| LedgerError::InvalidGenesisAccount { value: raw.clone() })?;
            match accounts.entry(account_id.clone()) {
                Entry::Occupied(_) => {
                    return Err(LedgerError::DuplicateGenesisAccount {
                        account: account_id.to_string(),
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(Account::new(account_id, *balance));
                }
            }
        }

        info!(
            chain_id = genesis.chain_id,
            accounts = accounts.len(),
            "ledger seeded from genesis"
        );

        Ok(Self {
            genesis,
            accounts: RwLock::new(accounts),
        })
    }

    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    /// Snapshot of one account.
    pub fn get(&self, account_id: &AccountId) -> Option<Account> {
        self.accounts.read().get(account_id).cloned()
    }

    /// Current balance, zero for an unknown account.
    pub fn balance(&self, account_id: &AccountId) -> u64 {
        self.accounts
            .read()
            .get(account_id)
            .map(|a| a.balance)
            .unwrap_or(0)
    }

    /// Nonce the account's next transaction should carry.
    pub fn next_nonce(&self, account_id: &AccountId) -> u64 {
        self.accounts
            .read()
            .get(account_id)
            .map(|a| a.nonce.saturating_add(1))
            .unwrap_or(1)
    }

    /// Records that the account's next transaction was applied.
    pub fn increment_nonce(&self, account_id: &AccountId) -> Result<u64, LedgerError> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| unknown(account_id))?;
        account.nonce = account.nonce.saturating_add(1);
        Ok(account.nonce)
    }

    /// Adds `amount`, creating the account if it does not exist yet.
    pub fn credit(&self, account_id: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        let mut accounts = self.accounts.write();
        credit_locked(&mut accounts, account_id, amount)
    }

    /// Removes `amount` from an existing account.
    pub fn debit(&self, account_id: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        let mut accounts = self.accounts.write();
        debit_locked(&mut accounts, account_id, amount)
    }

    /// Moves `amount` from `from` to `to` under one exclusive guard.
    ///
    /// Every check runs before anything is written, so on error neither
    /// balance has changed.
    pub fn transfer(&self, from: &AccountId, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write();

        // 1. Sender exists.
        let sender_balance = accounts.get(from).ok_or_else(|| unknown(from))?.balance;

        // 2. Sender can afford it.
        if sender_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.to_string(),
                balance: sender_balance,
                required: amount,
            });
        }

        // 3. Recipient cannot overflow. A self-transfer nets to zero.
        if from != to {
            let recipient_balance = accounts.get(to).map(|a| a.balance).unwrap_or(0);
            if recipient_balance.checked_add(amount).is_none() {
                return Err(LedgerError::BalanceOverflow {
                    account: to.to_string(),
                    amount,
                });
            }
        }

        // 4 + 5. Apply.
        debit_locked(&mut accounts, from, amount)?;
        credit_locked(&mut accounts, to, amount)?;

        debug!(%from, %to, amount, "transfer applied");
        Ok(())
    }

    /// Applies a validated transaction: nonce check, value move and nonce
    /// bump under one exclusive guard.
    ///
    /// Two callers racing on the same transaction cannot both succeed. The
    /// tip is not collected since there is no block producer to receive it.
    pub fn apply(&self, tx: &Tx) -> Result<(), LedgerError> {
        let (from, to, amount) = (tx.from_id(), tx.to_id(), tx.value());
        let mut accounts = self.accounts.write();

        let sender = accounts.get(from).ok_or_else(|| unknown(from))?;
        let expected = sender.nonce.saturating_add(1);
        if tx.nonce() != expected {
            return Err(LedgerError::NonceMismatch {
                account: from.to_string(),
                expected,
                got: tx.nonce(),
            });
        }
        if sender.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.to_string(),
                balance: sender.balance,
                required: amount,
            });
        }
        if from != to {
            let recipient_balance = accounts.get(to).map(|a| a.balance).unwrap_or(0);
            if recipient_balance.checked_add(amount).is_none() {
                return Err(LedgerError::BalanceOverflow {
                    account: to.to_string(),
                    amount,
                });
            }
        }

        debit_locked(&mut accounts, from, amount)?;
        credit_locked(&mut accounts, to, amount)?;
        if let Some(sender) = accounts.get_mut(from) {
            sender.nonce = expected;
        }

        debug!(%from, %to, amount, nonce = expected, "transaction applied");
        Ok(())
    }

    /// Snapshot of every account, ordered by id.
    pub fn accounts(&self) -> Vec<Account> {
        let mut all: Vec<Account> = self.accounts.read().values().cloned().collect();
        all.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        all
    }

    /// Sum of all balances. Saturates rather than wrapping.
    pub fn total_balance(&self) -> u64 {
        self.accounts
            .read()
            .values()
            .fold(0u64, |acc, a| acc.saturating_add(a.balance))
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

fn unknown(account_id: &AccountId) -> LedgerError {
    LedgerError::UnknownAccount {
        account: account_id.to_string(),
    }
}

fn credit_locked(
    accounts: &mut HashMap<AccountId, Account>,
    account_id: &AccountId,
    amount: u64,
) -> Result<u64, LedgerError> {
    let account = accounts
        .entry(account_id.clone())
        .or_insert_with(|| Account::new(account_id.clone(), 0));
    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::BalanceOverflow {
            account: account_id.to_string(),
            amount,
        })?;
    Ok(account.balance)
}

fn debit_locked(
    accounts: &mut HashMap<AccountId, Account>,
    account_id: &AccountId,
    amount: u64,
) -> Result<u64, LedgerError> {
    let account = accounts
        .get_mut(account_id)
        .ok_or_else(|| unknown(account_id))?;
    let balance = account.balance;
    account.balance = balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::InsufficientFunds {
            account: account_id.to_string(),
            balance,
            required: amount,
        })?;
    Ok(account.balance)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn id(byte: u8) -> AccountId {
        AccountId::from_bytes([byte; 20])
    }

    fn seeded() -> Database {
        let genesis = Genesis::new(1)
            .with_balance(id(1).as_str(), 1_000)
            .with_balance(id(2).as_str().to_lowercase(), 50);
        Database::new(genesis).unwrap()
    }

    #[test]
    fn seeds_from_genesis() {
        let db = seeded();
        assert_eq!(db.len(), 2);
        assert!(!db.is_empty());
        assert_eq!(db.balance(&id(1)), 1_000);
        assert_eq!(db.balance(&id(2)), 50);
        assert_eq!(db.get(&id(1)).unwrap().nonce, 0);
        assert_eq!(db.genesis().chain_id, 1);
    }

    #[test]
    fn invalid_genesis_key_rejected() {
        let genesis = Genesis::new(1).with_balance("0x1234", 10);
        match Database::new(genesis) {
            Err(LedgerError::InvalidGenesisAccount { value }) => assert_eq!(value, "0x1234"),
            Err(other) => panic!("expected InvalidGenesisAccount, got {:?}", other),
            Ok(_) => panic!("expected InvalidGenesisAccount"),
        }
    }

    #[test]
    fn duplicate_genesis_spellings_rejected() {
        let binding = id(0xab);
        let hex = &binding.as_str()[2..];
        let genesis = Genesis::new(1)
            .with_balance(format!("0x{}", hex.to_lowercase()), 100)
            .with_balance(format!("0X{}", hex.to_uppercase()), 50);
        assert_eq!(genesis.total_supply(), Some(150));

        match Database::new(genesis) {
            Err(LedgerError::DuplicateGenesisAccount { account }) => {
                assert_eq!(account, id(0xab).to_string())
            }
            Err(other) => panic!("expected DuplicateGenesisAccount, got {:?}", other),
            Ok(_) => panic!("expected DuplicateGenesisAccount"),
        }
    }

    #[test]
    fn empty_genesis_key_rejected() {
        let genesis = Genesis::new(1).with_balance("", 10);
        assert!(matches!(
            Database::new(genesis),
            Err(LedgerError::InvalidGenesisAccount { .. })
        ));
    }

    #[test]
    fn credit_creates_account() {
        let db = seeded();
        assert!(db.get(&id(9)).is_none());
        assert_eq!(db.credit(&id(9), 7).unwrap(), 7);
        assert_eq!(db.get(&id(9)).unwrap(), Account::new(id(9), 7));
    }

    #[test]
    fn credit_overflow() {
        let db = seeded();
        match db.credit(&id(1), u64::MAX) {
            Err(LedgerError::BalanceOverflow { amount, .. }) => assert_eq!(amount, u64::MAX),
            other => panic!("expected BalanceOverflow, got {:?}", other),
        }
        assert_eq!(db.balance(&id(1)), 1_000);
    }

    #[test]
    fn debit_unknown_and_insufficient() {
        let db = seeded();
        assert!(matches!(
            db.debit(&id(9), 1),
            Err(LedgerError::UnknownAccount { .. })
        ));
        match db.debit(&id(2), 51) {
            Err(LedgerError::InsufficientFunds { balance, required, .. }) => {
                assert_eq!(balance, 50);
                assert_eq!(required, 51);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        assert_eq!(db.debit(&id(2), 50).unwrap(), 0);
    }

    #[test]
    fn nonce_progression() {
        let db = seeded();
        assert_eq!(db.next_nonce(&id(1)), 1);
        assert_eq!(db.next_nonce(&id(9)), 1);
        assert_eq!(db.increment_nonce(&id(1)).unwrap(), 1);
        assert_eq!(db.next_nonce(&id(1)), 2);
        assert!(db.increment_nonce(&id(9)).is_err());
    }

    #[test]
    fn transfer_moves_balance() {
        let db = seeded();
        db.transfer(&id(1), &id(3), 400).unwrap();
        assert_eq!(db.balance(&id(1)), 600);
        assert_eq!(db.balance(&id(3)), 400);
        assert_eq!(db.total_balance(), 1_050);
    }

    #[test]
    fn failed_transfer_changes_nothing() {
        let db = seeded();
        let before = db.accounts();

        assert!(db.transfer(&id(2), &id(1), 51).is_err());
        assert!(db.transfer(&id(9), &id(1), 1).is_err());
        db.credit(&id(3), u64::MAX).unwrap();
        let before_overflow = db.accounts();
        assert!(matches!(
            db.transfer(&id(1), &id(3), 1),
            Err(LedgerError::BalanceOverflow { .. })
        ));

        assert_eq!(db.accounts(), before_overflow);
        assert_eq!(&db.accounts()[..2], &before[..]);
    }

    fn payment(nonce: u64, value: u64) -> Tx {
        Tx::new(1, nonce, id(1), id(3), value, 0, vec![]).unwrap()
    }

    #[test]
    fn apply_moves_value_and_bumps_nonce() {
        let db = seeded();
        db.apply(&payment(1, 250)).unwrap();
        assert_eq!(db.balance(&id(1)), 750);
        assert_eq!(db.balance(&id(3)), 250);
        assert_eq!(db.next_nonce(&id(1)), 2);
        assert_eq!(db.get(&id(3)).unwrap().nonce, 0);
    }

    #[test]
    fn apply_rejects_out_of_order_nonce() {
        let db = seeded();
        match db.apply(&payment(2, 1)) {
            Err(LedgerError::NonceMismatch { expected, got, .. }) => {
                assert_eq!(expected, 1);
                assert_eq!(got, 2);
            }
            other => panic!("expected NonceMismatch, got {:?}", other),
        }

        db.apply(&payment(1, 1)).unwrap();
        assert!(matches!(
            db.apply(&payment(1, 1)),
            Err(LedgerError::NonceMismatch { expected: 2, got: 1, .. })
        ));
        assert_eq!(db.balance(&id(3)), 1);
    }

    #[test]
    fn failed_apply_leaves_nonce_alone() {
        let db = seeded();
        let before = db.accounts();
        assert!(matches!(
            db.apply(&payment(1, 1_001)),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        let unknown_sender = Tx::new(1, 1, id(9), id(1), 1, 0, vec![]).unwrap();
        assert!(matches!(
            db.apply(&unknown_sender),
            Err(LedgerError::UnknownAccount { .. })
        ));
        assert_eq!(db.accounts(), before);
    }

    #[test]
    fn concurrent_apply_of_one_tx_succeeds_once() {
        let db = Arc::new(seeded());
        let tx = Arc::new(payment(1, 100));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                let tx = Arc::clone(&tx);
                thread::spawn(move || db.apply(&tx).is_ok())
            })
            .collect();
        let applied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(applied, 1);
        assert_eq!(db.balance(&id(1)), 900);
        assert_eq!(db.balance(&id(3)), 100);
        assert_eq!(db.next_nonce(&id(1)), 2);
    }

    #[test]
    fn accounts_snapshot_is_sorted() {
        let db = seeded();
        db.credit(&id(0), 1).unwrap();
        let ids: Vec<AccountId> = db.accounts().into_iter().map(|a| a.account_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn concurrent_transfers_conserve_supply() {
        let db = Arc::new(seeded());
        let total = db.total_balance();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let (from, to) = if i % 2 == 0 { (id(1), id(2)) } else { (id(2), id(1)) };
                        let _ = db.transfer(&from, &to, 3);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(db.total_balance(), total);
    }
}
