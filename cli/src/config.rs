//! Command line arguments and the configuration file.

use alloy_primitives::TxHash;
use clap::{Args, Parser, Subcommand};
use evm_pay_eip155::chain::ChecksummedAddress;
use evm_pay_eip155::fee::RawFeeParameters;
use evm_pay_orchestrator::PaymentConfig;
use evm_pay_types::chain::ChainId;
use evm_pay_types::util::money_amount::MoneyAmount;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "evm-pay")]
#[command(about = "Multi-chain EVM payment orchestrator")]
pub struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "evm-pay.json")]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured chains
    Chains,
    /// Resolve whether a chain uses EIP-1559 or legacy fees
    Probe {
        /// CAIP-2 id, numeric chain id or network name
        #[arg(long)]
        chain: String,
    },
    /// Run a payment against the dry-run signing boundary
    Pay(PayArgs),
    /// Check whether a transaction is confirmed
    Receipt {
        /// Chain to query; Ethereum when omitted
        #[arg(long)]
        chain: Option<String>,
        #[arg(long)]
        tx: TxHash,
    },
    /// Show a transaction as the node reports it
    Transaction {
        /// Chain to query; Ethereum when omitted
        #[arg(long)]
        chain: Option<String>,
        #[arg(long)]
        tx: TxHash,
    },
}

#[derive(Args, Debug)]
pub struct PayArgs {
    /// CAIP-2 id, numeric chain id or network name the wallet is connected to
    #[arg(long)]
    pub chain: String,
    /// Paying wallet address
    #[arg(long)]
    pub from: ChecksummedAddress,
    /// Human amount, e.g. `0.5` or `10.5`
    #[arg(long)]
    pub amount: MoneyAmount,
    /// Recipient; the configured treasury when omitted
    #[arg(long)]
    pub to: Option<String>,
    /// ERC20 symbol; a native transfer when omitted
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long, default_value = "Payment")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Approve without asking
    #[arg(long)]
    pub yes: bool,
    /// Ask the chain's RPC for fees instead of the configured `fees`
    #[arg(long)]
    pub live_fees: bool,
    /// First session request id handed out by the dry-run boundary
    #[arg(long, default_value_t = 1)]
    pub request_id: u64,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    payment: PaymentConfig,
    /// Fee recommendations the dry-run boundary answers with, per chain.
    #[serde(default)]
    fees: HashMap<ChainId, RawFeeParameters>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    pub fn payment(&self) -> &PaymentConfig {
        &self.payment
    }

    pub fn fees(&self) -> &HashMap<ChainId, RawFeeParameters> {
        &self.fees
    }

    /// Reads the file at `path`. A missing file means built-in defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
