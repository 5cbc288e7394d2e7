//! # Genesis
//!
//! The genesis file fixes the chain id and the opening balances. It is the
//! only runtime configuration the ledger reads, and it is read exactly
//! once, at startup.
//!
//! ```json
//! {
//!   "date": "2026-01-01T00:00:00Z",
//!   "chain_id": 1,
//!   "trans_per_block": 10,
//!   "difficulty": 6,
//!   "mining_reward": 700,
//!   "gas_price": 15,
//!   "balances": {
//!     "0xF01813E4B85e178A83e29B8E7bF26BD830a25f32": 1000000
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::config::CHAIN_ID_DEVNET;

/// Errors that can occur while loading a genesis file.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("failed to read genesis file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse genesis file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Opening state of a chain.
///
/// Balances are keyed by the raw account string from the file; the ledger
/// validates each key when it seeds accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    pub date: DateTime<Utc>,
    pub chain_id: u16,
    pub trans_per_block: u16,
    pub difficulty: u16,
    pub mining_reward: u64,
    pub gas_price: u64,
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,
}

impl Genesis {
    /// A genesis with no balances, dated now.
    pub fn new(chain_id: u16) -> Self {
        Self {
            date: Utc::now(),
            chain_id,
            trans_per_block: 10,
            difficulty: 6,
            mining_reward: 700,
            gas_price: 15,
            balances: BTreeMap::new(),
        }
    }

    /// Adds an opening balance. Chainable.
    pub fn with_balance(mut self, account: impl Into<String>, balance: u64) -> Self {
        self.balances.insert(account.into(), balance);
        self
    }

    /// Parses a genesis document.
    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the genesis file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenesisError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Sum of all opening balances, or `None` on overflow.
    pub fn total_supply(&self) -> Option<u64> {
        self.balances
            .values()
            .try_fold(0u64, |acc, b| acc.checked_add(*b))
    }
}

impl Default for Genesis {
    fn default() -> Self {
        Self::new(CHAIN_ID_DEVNET)
    }
}
