//! Deciding whether a transfer on a chain uses EIP-1559 or legacy fees.
//!
//! A chain gets EIP-1559 fees only if it is on the configured allow-list AND a
//! live probe of its RPC endpoint confirms the London fee market is active.
//! Chains off the allow-list are legacy without any network call.

use async_trait::async_trait;
use evm_pay_types::chain::{ChainDescriptor, ChainIdPattern};
use evm_pay_types::failure::FailureKind;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::rpc::{JsonRpcClient, RpcError};

/// The fee model a transaction is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    Legacy,
    Eip1559,
}

impl fmt::Display for FeeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeModel::Legacy => write!(f, "legacy"),
            FeeModel::Eip1559 => write!(f, "eip1559"),
        }
    }
}

/// Read-only check of whether an RPC endpoint serves an EIP-1559 chain.
#[async_trait]
pub trait Eip1559Probe: Send + Sync {
    async fn supports_eip1559(&self, rpc_url: &Url) -> Result<bool, RpcError>;
}

#[async_trait]
impl Eip1559Probe for JsonRpcClient {
    async fn supports_eip1559(&self, rpc_url: &Url) -> Result<bool, RpcError> {
        self.supports_base_fee(rpc_url).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("RPC URL is missing for chain {0}")]
    MissingRpcUrl(String),
    #[error("EIP-1559 probe failed for chain {chain}: {source}")]
    Probe {
        chain: String,
        #[source]
        source: RpcError,
    },
}

impl From<CapabilityError> for FailureKind {
    fn from(value: CapabilityError) -> Self {
        match value {
            CapabilityError::MissingRpcUrl(chain) => FailureKind::MissingRpcUrl(chain),
            e @ CapabilityError::Probe { .. } => FailureKind::CapabilityProbeFailed(e.to_string()),
        }
    }
}

/// Chains that may use EIP-1559 fees: Ethereum, Polygon, Avalanche, Arbitrum, Optimism.
pub fn default_eip1559_allow_list() -> Vec<ChainIdPattern> {
    vec![ChainIdPattern::set(
        "eip155",
        ["1", "137", "43114", "42161", "10"],
    )]
}

#[derive(Clone)]
pub struct ChainCapabilityResolver {
    allow_list: Vec<ChainIdPattern>,
    probe: Arc<dyn Eip1559Probe>,
}

impl fmt::Debug for ChainCapabilityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCapabilityResolver")
            .field("allow_list", &self.allow_list)
            .finish_non_exhaustive()
    }
}

impl ChainCapabilityResolver {
    pub fn new(allow_list: Vec<ChainIdPattern>, probe: Arc<dyn Eip1559Probe>) -> Self {
        Self { allow_list, probe }
    }

    /// Resolver with the default allow-list.
    pub fn with_probe(probe: Arc<dyn Eip1559Probe>) -> Self {
        Self::new(default_eip1559_allow_list(), probe)
    }

    pub fn allow_list(&self) -> &[ChainIdPattern] {
        &self.allow_list
    }

    /// Allow-list membership only. No network access.
    pub fn supports_eip1559_by_default(&self, chain: &ChainDescriptor) -> bool {
        self.allow_list
            .iter()
            .any(|pattern| pattern.matches(&chain.id))
    }

    pub async fn probe_eip1559(&self, rpc_url: &Url) -> Result<bool, RpcError> {
        self.probe.supports_eip1559(rpc_url).await
    }

    /// Resolves the fee model for `chain`.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::MissingRpcUrl`] when the chain has no RPC endpoint, and
    /// [`CapabilityError::Probe`] when the probe fails. A failed probe is never
    /// treated as "legacy".
    pub async fn resolve(&self, chain: &ChainDescriptor) -> Result<FeeModel, CapabilityError> {
        let rpc_url = chain
            .rpc_url
            .as_ref()
            .ok_or_else(|| CapabilityError::MissingRpcUrl(chain.id.to_string()))?;
        if !self.supports_eip1559_by_default(chain) {
            #[cfg(feature = "telemetry")]
            tracing::debug!(chain = %chain.id, "Chain is not on the EIP-1559 allow-list");
            return Ok(FeeModel::Legacy);
        }
        let live = self
            .probe_eip1559(rpc_url)
            .await
            .map_err(|source| CapabilityError::Probe {
                chain: chain.id.to_string(),
                source,
            })?;
        let model = if live {
            FeeModel::Eip1559
        } else {
            FeeModel::Legacy
        };
        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %chain.id, %model, "Resolved fee model");
        Ok(model)
    }
}
