// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tally CLI
//!
//! Entry point for the `tally` binary. Parses CLI arguments, initializes
//! logging, and dispatches to a subcommand. Every command prints its result
//! to stdout as JSON.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;

use tally_protocol::config::network_name;
use tally_protocol::{AccountId, Database, Genesis, Keypair, SignedTx, Tx, TxStatus};

use cli::{ApplyArgs, BuildArgs, Commands, KeyArgs, SignArgs, TallyCli, ValidateArgs};

fn main() -> Result<()> {
    let cli = TallyCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    match cli.command {
        Commands::Generate => generate(),
        Commands::Address(args) => address(args),
        Commands::Build(args) => build(args),
        Commands::Sign(args) => sign(args),
        Commands::Validate(args) => validate(args),
        Commands::Apply(args) => apply(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct GeneratedKey {
    account_id: AccountId,
    public_key: String,
    secret_key: String,
}

fn generate() -> Result<()> {
    let keypair = Keypair::generate();
    tracing::info!(account = %keypair.account_id(), "generated keypair");
    print_json(&GeneratedKey {
        account_id: keypair.account_id(),
        public_key: keypair.public_key().to_hex(),
        secret_key: keypair.secret_key_hex(),
    })
}

fn address(args: KeyArgs) -> Result<()> {
    let keypair = load_key(&args)?;
    println!("{}", keypair.account_id());
    Ok(())
}

fn build(args: BuildArgs) -> Result<()> {
    let from = AccountId::parse(&args.from).context("invalid --from")?;
    let to = AccountId::parse(&args.to).context("invalid --to")?;
    let data_hex = args.data.strip_prefix("0x").unwrap_or(&args.data);
    let data = hex::decode(data_hex).context("--data is not hex")?;

    let tx = Tx::new(args.chain_id, args.nonce, from, to, args.value, args.tip, data)?;
    print_json(&tx)
}

fn sign(args: SignArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    let tx: Tx = read_json(&args.tx)?;

    if tx.from_id() != &keypair.account_id() {
        tracing::warn!(
            from = %tx.from_id(),
            signer = %keypair.account_id(),
            "signing key does not own the from account; validation will reject this"
        );
    }

    let signed = tx.sign(&keypair)?;
    tracing::info!(tx = %signed, "signed transaction");
    print_json(&signed)
}

#[derive(Serialize)]
struct ValidationReport {
    tx: String,
    chain: String,
    status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    signer: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn validate(args: ValidateArgs) -> Result<()> {
    let signed: SignedTx = read_json(&args.tx)?;
    let result = signed.validate(args.chain_id);
    let status = TxStatus::after_validation(&result);

    print_json(&ValidationReport {
        tx: signed.to_string(),
        chain: network_name(args.chain_id),
        status,
        signer: signed.recover_sender().ok(),
        error: result.as_ref().err().map(ToString::to_string),
    })?;

    if let Err(err) = result {
        bail!("transaction {} rejected: {}", signed, err);
    }
    Ok(())
}

#[derive(Serialize)]
struct ApplyOutcome {
    tx: String,
    status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ApplyReport {
    chain_id: u16,
    outcomes: Vec<ApplyOutcome>,
    accounts: Vec<tally_protocol::Account>,
}

fn apply(args: ApplyArgs) -> Result<()> {
    let genesis = Genesis::load(&args.genesis)
        .with_context(|| format!("failed to load genesis from {}", args.genesis.display()))?;
    let chain_id = genesis.chain_id;
    let ledger = Database::new(genesis)?;

    let mut outcomes = Vec::with_capacity(args.txs.len());
    for path in &args.txs {
        let signed: SignedTx = read_json(path)?;
        let outcome = match apply_one(&ledger, &signed, chain_id) {
            Ok(()) => ApplyOutcome {
                tx: signed.to_string(),
                status: TxStatus::Applied,
                error: None,
            },
            Err(err) => {
                tracing::warn!(tx = %signed, error = %err, "transaction not applied");
                ApplyOutcome {
                    tx: signed.to_string(),
                    status: TxStatus::Rejected,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    print_json(&ApplyReport {
        chain_id,
        outcomes,
        accounts: ledger.accounts(),
    })
}

/// Validate, then check the nonce, move the value and advance the nonce in
/// one ledger step.
fn apply_one(ledger: &Database, signed: &SignedTx, chain_id: u16) -> Result<()> {
    signed.validate(chain_id)?;
    ledger.apply(signed.tx())?;
    Ok(())
}

fn print_version() {
    println!("tally {}", env!("CARGO_PKG_VERSION"));
    println!("  digest version: {}", tally_protocol::config::DIGEST_VERSION);
}

fn load_key(args: &KeyArgs) -> Result<Keypair> {
    Keypair::from_hex(&args.key).context("invalid secret key")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{}", rendered);
    Ok(())
}
