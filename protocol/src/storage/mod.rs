//! # Storage Module
//!
//! The account ledger index: who holds what, and which nonce comes next.
//!
//! ## Data Flow
//!
//! ```text
//! Genesis ──seed──▶ Database ◀──transfer── validated SignedTx
//! ```
//!
//! State lives in memory for the lifetime of the process. Persistence and
//! block production sit above this layer.

pub mod database;

pub use database::{Account, Database, LedgerError};
