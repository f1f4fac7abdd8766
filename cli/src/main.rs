//! `evm-pay` command line entrypoint.
//!
//! Commands:
//! - `chains` – List configured chains with their RPC endpoint and EIP-1559 eligibility
//! - `probe` – Resolve the live fee model of a chain
//! - `pay` – Run a payment through the orchestrator against a dry-run signing boundary
//! - `receipt` – Check whether a transaction is confirmed
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `CONFIG` points to the JSON configuration file
//! - `RUST_LOG` controls log verbosity, `info` by default

mod boundary;
mod config;
mod console;
mod run;

use std::process;

use crate::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
