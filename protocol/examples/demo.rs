//! Walkthrough of the Tally transfer lifecycle.
//!
//! Creates identities, seeds a genesis ledger, signs and validates a few
//! transfers (including a forged and a cross-chain one), and prints the
//! resulting balances. The output uses ANSI escape codes for colored
//! terminal rendering.
//!
//! Run with:
//!   cargo run --example demo

use std::time::Instant;

use tally_protocol::config::network_name;
use tally_protocol::{Database, Genesis, Keypair, SignedTx, Tx, TxStatus};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(title: &str) {
    println!();
    println!("{BOLD}{CYAN}== {title} =={RESET}");
}

fn outcome(label: &str, status: TxStatus, detail: &str) {
    let color = if status == TxStatus::Applied { GREEN } else { RED };
    let status = status.to_string();
    println!("  {label:<28} {color}{status:<9}{RESET} {DIM}{detail}{RESET}");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

fn submit(ledger: &Database, signed: &SignedTx) -> (TxStatus, String) {
    let chain_id = ledger.genesis().chain_id;
    if let Err(err) = signed.validate(chain_id) {
        return (TxStatus::Rejected, err.to_string());
    }

    let tx = signed.tx();
    let applied = ledger.apply(tx);
    let detail = match &applied {
        Ok(()) => format!("{} -> {}: {}", tx.from_id(), tx.to_id(), tx.value()),
        Err(err) => err.to_string(),
    };
    (TxStatus::after_apply(&applied), detail)
}

fn transfer(from: &Keypair, to: &Keypair, chain_id: u16, nonce: u64, value: u64) -> SignedTx {
    Tx::new(chain_id, nonce, from.account_id(), to.account_id(), value, 0, vec![])
        .expect("generated ids are valid")
        .sign(from)
        .expect("signing with a generated key")
}

fn main() {
    let started = Instant::now();

    section("Identities");
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    let carol = Keypair::generate();
    for (name, kp) in [("alice", &alice), ("bob", &bob), ("carol", &carol)] {
        println!("  {name:<6} {}", kp.account_id());
    }

    section("Genesis");
    let genesis = Genesis::new(1)
        .with_balance(alice.account_id().as_str(), 1_000)
        .with_balance(bob.account_id().as_str(), 250);
    println!("  chain {} ({})", genesis.chain_id, network_name(genesis.chain_id));
    let ledger = Database::new(genesis).expect("generated ids are valid");

    section("Transfers");
    let cases = [
        ("alice pays bob 300", transfer(&alice, &bob, 1, 1, 300)),
        ("bob pays carol 100", transfer(&bob, &carol, 1, 1, 100)),
        ("alice replays nonce 1", transfer(&alice, &bob, 1, 1, 300)),
        ("alice signs for chain 2", transfer(&alice, &carol, 2, 2, 10)),
        ("carol overdraws", transfer(&carol, &alice, 1, 1, 500)),
    ];
    for (label, signed) in &cases {
        let (status, detail) = submit(&ledger, signed);
        outcome(label, status, &detail);
    }

    // Carol signs a transfer out of Alice's account.
    let forged = Tx::new(1, 2, alice.account_id(), carol.account_id(), 700, 0, vec![])
        .expect("generated ids are valid")
        .sign(&carol)
        .expect("signing with a generated key");
    let (status, detail) = submit(&ledger, &forged);
    outcome("carol forges alice", status, &detail);

    section("Balances");
    for account in ledger.accounts() {
        println!(
            "  {} balance={:<6} nonce={}",
            account.account_id, account.balance, account.nonce
        );
    }

    println!();
    println!("{DIM}done in {:?}{RESET}", started.elapsed());
}
