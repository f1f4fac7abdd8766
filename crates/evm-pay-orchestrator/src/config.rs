//! Payment configuration.
//!
//! Every field is optional; a missing field falls back to the built-in defaults:
//!
//! ```json
//! {
//!   "chains": {
//!     "eip155:1": { "rpc": "$ETHEREUM_RPC_URL" },
//!     "eip155:56": { "name": "BNB Smart Chain", "rpc": "https://bsc-mainnet.token.im" }
//!   },
//!   "eip1559": ["eip155:{1,137,43114,42161,10}"],
//!   "tokens": [
//!     { "chain": "eip155:56", "symbol": "USDT", "address": "0x55d398326f99059fF775485246999027B3197955", "decimals": 6 }
//!   ],
//!   "credentials": { "accessKey": "$EVM_PAY_ACCESS_KEY", "secretKey": "$EVM_PAY_SECRET_KEY" },
//!   "treasury": "0xcBa852Ef29a43a7542B88F60C999eD9cB66f6000",
//!   "pendingOrderTtl": 3600
//! }
//! ```

use evm_pay_eip155::capability::default_eip1559_allow_list;
use evm_pay_eip155::chain::{ChecksummedAddress, Erc20Token, TokenRegistry};
use evm_pay_eip155::networks::PRESET_TOKENS;
use evm_pay_types::chain::{ChainDescriptor, ChainId, ChainIdPattern, ChainRegistry};
use evm_pay_types::config::LiteralOrEnv;
use evm_pay_types::networks::KNOWN_NETWORKS;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::boundary::Credentials;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    #[serde(default)]
    chains: Option<HashMap<ChainId, ChainConfig>>,
    #[serde(default = "config_defaults::default_eip1559")]
    eip1559: Vec<ChainIdPattern>,
    #[serde(default)]
    tokens: Option<Vec<TokenConfig>>,
    #[serde(default)]
    credentials: CredentialsConfig,
    #[serde(default)]
    treasury: Option<ChecksummedAddress>,
    /// JSON-RPC request timeout, seconds.
    #[serde(default = "config_defaults::default_rpc_timeout")]
    rpc_timeout: u64,
    /// How long an accepted order waits for its wallet response, seconds.
    #[serde(default = "config_defaults::default_pending_order_ttl")]
    pending_order_ttl: u64,
}

/// Per-chain overrides. Unset fields fall back to the well-known network.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rpc: Option<LiteralOrEnv<Url>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub chain: ChainId,
    pub symbol: String,
    pub address: ChecksummedAddress,
    pub decimals: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsConfig {
    #[serde(default)]
    pub access_key: LiteralOrEnv<String>,
    #[serde(default)]
    pub secret_key: LiteralOrEnv<String>,
}

pub mod config_defaults {
    use evm_pay_types::chain::ChainIdPattern;
    use std::env;

    pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_PENDING_ORDER_TTL_SECS: u64 = 60 * 60;

    pub fn default_eip1559() -> Vec<ChainIdPattern> {
        evm_pay_eip155::capability::default_eip1559_allow_list()
    }

    /// Returns the default RPC timeout with fallback: $RPC_TIMEOUT env var -> 10
    pub fn default_rpc_timeout() -> u64 {
        env::var("RPC_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RPC_TIMEOUT_SECS)
    }

    pub fn default_pending_order_ttl() -> u64 {
        DEFAULT_PENDING_ORDER_TTL_SECS
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentConfigError {
    #[error("Token {symbol} refers to unconfigured chain {chain}")]
    UnknownTokenChain { symbol: String, chain: ChainId },
}

impl Default for PaymentConfig {
    fn default() -> Self {
        PaymentConfig {
            chains: None,
            eip1559: default_eip1559_allow_list(),
            tokens: None,
            credentials: CredentialsConfig::default(),
            treasury: None,
            rpc_timeout: config_defaults::DEFAULT_RPC_TIMEOUT_SECS,
            pending_order_ttl: config_defaults::DEFAULT_PENDING_ORDER_TTL_SECS,
        }
    }
}

impl PaymentConfig {
    pub fn eip1559(&self) -> &[ChainIdPattern] {
        &self.eip1559
    }

    pub fn treasury(&self) -> Option<ChecksummedAddress> {
        self.treasury
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout)
    }

    pub fn pending_order_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_order_ttl)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.credentials.access_key.inner().as_str(),
            self.credentials.secret_key.inner().as_str(),
        )
    }

    /// Configured chains, or every well-known network when `chains` is absent.
    pub fn chain_registry(&self) -> ChainRegistry {
        let Some(chains) = &self.chains else {
            return ChainRegistry::known();
        };
        chains
            .iter()
            .map(|(chain_id, config)| {
                let known = KNOWN_NETWORKS
                    .iter()
                    .find(|network| network.chain_id() == *chain_id)
                    .map(|network| network.descriptor());
                let name = config
                    .name
                    .clone()
                    .or_else(|| known.as_ref().map(|c| c.name.clone()))
                    .unwrap_or_else(|| chain_id.to_string());
                let rpc_url = config
                    .rpc
                    .as_ref()
                    .map(|rpc| rpc.inner().clone())
                    .or_else(|| known.and_then(|c| c.rpc_url));
                ChainDescriptor::new(chain_id.clone(), name, rpc_url)
            })
            .collect()
    }

    /// Configured tokens, or the stablecoin presets on the configured chains.
    pub fn token_registry(&self, chains: &ChainRegistry) -> Result<TokenRegistry, PaymentConfigError> {
        let Some(tokens) = &self.tokens else {
            return Ok(TokenRegistry::from_presets(PRESET_TOKENS.iter(), chains));
        };
        tokens
            .iter()
            .map(|token| {
                let chain = chains.by_chain_id(&token.chain).ok_or_else(|| {
                    PaymentConfigError::UnknownTokenChain {
                        symbol: token.symbol.clone(),
                        chain: token.chain.clone(),
                    }
                })?;
                Ok(Erc20Token {
                    chain: chain.clone(),
                    symbol: token.symbol.clone(),
                    contract_address: token.address,
                    decimals: token.decimals,
                })
            })
            .collect()
    }
}
