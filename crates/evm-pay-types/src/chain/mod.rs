//! Chains a payment can be made on.
//!
//! - [`ChainId`] - CAIP-2 chain identifier (`eip155:1`)
//! - [`ChainIdPattern`] - Pattern matching for chain ids (exact, wildcard, or set)
//! - [`ChainDescriptor`] - What the orchestrator knows about a chain
//! - [`ChainRegistry`] - Configured chains indexed by id

mod chain_id;

pub use chain_id::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::networks::KNOWN_NETWORKS;

/// Decimals of every EVM native currency (ETH, BNB, MATIC, AVAX, ...).
pub const NATIVE_DECIMALS: u8 = 18;

/// Immutable description of a chain, shared by wallet sessions and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub id: ChainId,
    pub name: String,
    /// JSON-RPC endpoint used for capability probes and receipt lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
}

impl ChainDescriptor {
    pub fn new<S: Into<String>>(id: ChainId, name: S, rpc_url: Option<Url>) -> Self {
        Self {
            id,
            name: name.into(),
            rpc_url,
        }
    }

    pub fn native_decimals(&self) -> u8 {
        NATIVE_DECIMALS
    }
}

/// Configured chains indexed by chain id.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry(HashMap<ChainId, ChainDescriptor>);

impl ChainRegistry {
    pub fn new(chains: HashMap<ChainId, ChainDescriptor>) -> Self {
        Self(chains)
    }

    /// Registry of every well-known network with its public RPC endpoint.
    pub fn known() -> Self {
        KNOWN_NETWORKS
            .iter()
            .map(|network| network.descriptor())
            .collect()
    }

    pub fn by_chain_id(&self, chain_id: &ChainId) -> Option<&ChainDescriptor> {
        self.0.get(chain_id)
    }

    /// All chains whose id matches `pattern`.
    pub fn by_chain_id_pattern(&self, pattern: &ChainIdPattern) -> Vec<&ChainDescriptor> {
        self.0
            .iter()
            .filter_map(|(chain_id, chain)| pattern.matches(chain_id).then_some(chain))
            .collect()
    }

    /// Resolves a user-supplied chain reference: a CAIP-2 id, a bare numeric id,
    /// or a well-known network name.
    pub fn lookup(&self, reference: &str) -> Option<&ChainDescriptor> {
        let chain_id = reference
            .parse::<ChainId>()
            .ok()
            .or_else(|| ChainId::from_network_name(reference))?;
        self.by_chain_id(&chain_id)
    }

    pub fn insert(&mut self, chain: ChainDescriptor) -> Option<ChainDescriptor> {
        self.0.insert(chain.id.clone(), chain)
    }

    /// Chains sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        let mut chains = self.0.values().collect::<Vec<_>>();
        chains.sort_by(|a, b| a.id.cmp(&b.id));
        chains.into_iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ChainDescriptor> for ChainRegistry {
    fn from_iter<T: IntoIterator<Item = ChainDescriptor>>(iter: T) -> Self {
        Self(iter.into_iter().map(|c| (c.id.clone(), c)).collect())
    }
}
