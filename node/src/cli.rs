//! # CLI Interface
//!
//! Defines the command-line argument structure for `tally` using `clap`
//! derive. Subcommands: `generate`, `address`, `build`, `sign`,
//! `validate`, `apply`, and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Tally key and transaction tool.
///
/// Generates secp256k1 keys, derives account ids, signs transfers, and
/// validates signed transfers against a chain id or a genesis ledger.
/// Results go to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Tally key and transaction tool",
    version,
    propagate_version = true
)]
pub struct TallyCli {
    /// Log output format.
    #[arg(long, global = true, value_enum, env = "TALLY_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `tally` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh keypair and print its account id.
    Generate,
    /// Print the account id owned by a secret key.
    Address(KeyArgs),
    /// Assemble an unsigned transaction.
    Build(BuildArgs),
    /// Sign an unsigned transaction file.
    Sign(SignArgs),
    /// Validate a signed transaction file.
    Validate(ValidateArgs),
    /// Validate signed transactions and apply them to a ledger seeded from
    /// a genesis file.
    Apply(ApplyArgs),
    /// Print version information and exit.
    Version,
}

/// Secret key input shared by commands that sign.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Hex-encoded 32-byte secp256k1 secret key, `0x` prefix optional.
    ///
    /// **Never pass this flag on a shared machine.** Prefer the
    /// environment variable.
    #[arg(long, env = "TALLY_KEY", hide_env_values = true)]
    pub key: String,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[arg(long, env = "TALLY_CHAIN_ID", default_value_t = 1)]
    pub chain_id: u16,

    #[arg(long)]
    pub nonce: u64,

    /// Sending account id.
    #[arg(long)]
    pub from: String,

    /// Receiving account id.
    #[arg(long)]
    pub to: String,

    #[arg(long)]
    pub value: u64,

    #[arg(long, default_value_t = 0)]
    pub tip: u64,

    /// Hex-encoded payload.
    #[arg(long, default_value = "")]
    pub data: String,
}

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Path to the unsigned transaction JSON.
    #[arg(long)]
    pub tx: PathBuf,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the signed transaction JSON.
    #[arg(long)]
    pub tx: PathBuf,

    /// Chain id the transaction must be bound to.
    #[arg(long, env = "TALLY_CHAIN_ID")]
    pub chain_id: u16,
}

/// Arguments for the `apply` subcommand.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the genesis JSON. Supplies the chain id and opening balances.
    #[arg(long, env = "TALLY_GENESIS")]
    pub genesis: PathBuf,

    /// Signed transaction files, applied in order.
    #[arg(long = "tx", required = true)]
    pub txs: Vec<PathBuf>,
}
