//! Well-known EVM networks.
//!
//! The registry pairs each network's short name (used on the command line, e.g.
//! `--chain polygon`) with its CAIP-2 id, display name and a public JSON-RPC
//! endpoint. Deployments override the endpoints through configuration.
//!
//! ```
//! use evm_pay_types::chain::ChainId;
//! use evm_pay_types::networks::chain_id_by_network_name;
//!
//! let polygon = chain_id_by_network_name("polygon").unwrap();
//! assert_eq!(polygon, &ChainId::new("eip155", "137"));
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

use crate::chain::{ChainDescriptor, ChainId};

/// A known network definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Short lowercase name, e.g. `"arbitrum"`.
    pub name: &'static str,
    pub display_name: &'static str,
    pub namespace: &'static str,
    pub reference: &'static str,
    /// Public JSON-RPC endpoint, if the network has a default one.
    pub default_rpc: Option<&'static str>,
}

impl NetworkInfo {
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.namespace, self.reference)
    }

    /// Descriptor with the default RPC endpoint.
    pub fn descriptor(&self) -> ChainDescriptor {
        let rpc_url = self.default_rpc.and_then(|rpc| Url::parse(rpc).ok());
        ChainDescriptor::new(self.chain_id(), self.display_name, rpc_url)
    }
}

const fn evm(
    name: &'static str,
    display_name: &'static str,
    reference: &'static str,
    default_rpc: Option<&'static str>,
) -> NetworkInfo {
    NetworkInfo {
        name,
        display_name,
        namespace: "eip155",
        reference,
        default_rpc,
    }
}

pub static KNOWN_NETWORKS: &[NetworkInfo] = &[
    evm(
        "ethereum",
        "Ethereum",
        "1",
        Some("https://eth-mainnet.token.im"),
    ),
    evm(
        "optimism",
        "Optimism",
        "10",
        Some("https://optimism-mainnet.token.im"),
    ),
    evm(
        "bsc",
        "BNB Smart Chain",
        "56",
        Some("https://bsc-mainnet.token.im"),
    ),
    evm("okx", "OKX Chain", "66", Some("https://exchainrpc.okex.org")),
    evm(
        "polygon",
        "Polygon",
        "137",
        Some("https://polygon-mainnet.token.im"),
    ),
    evm(
        "base",
        "Base",
        "8453",
        Some("https://base-mainnet.token.im"),
    ),
    evm("ethereum-pow", "EthereumPoW", "10001", None),
    evm(
        "arbitrum",
        "Arbitrum One",
        "42161",
        Some("https://arbitrum-mainnet.token.im"),
    ),
    evm(
        "avalanche",
        "Avalanche C-Chain",
        "43114",
        Some("https://api.avax.network/ext/bc/C/rpc"),
    ),
    evm("linea", "Linea", "59144", Some("https://rpc.linea.build")),
];

pub static NAME_TO_CHAIN_ID: LazyLock<HashMap<&'static str, ChainId>> = LazyLock::new(|| {
    KNOWN_NETWORKS
        .iter()
        .map(|n| (n.name, n.chain_id()))
        .collect()
});

pub static CHAIN_ID_TO_NAME: LazyLock<HashMap<ChainId, &'static str>> = LazyLock::new(|| {
    KNOWN_NETWORKS
        .iter()
        .map(|n| (n.chain_id(), n.name))
        .collect()
});

/// Case-sensitive lookup of a chain id by short network name.
pub fn chain_id_by_network_name(name: &str) -> Option<&ChainId> {
    NAME_TO_CHAIN_ID.get(name)
}

pub fn network_name_by_chain_id(chain_id: &ChainId) -> Option<&'static str> {
    CHAIN_ID_TO_NAME.get(chain_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        assert_eq!(NAME_TO_CHAIN_ID.len(), KNOWN_NETWORKS.len());
        assert_eq!(CHAIN_ID_TO_NAME.len(), KNOWN_NETWORKS.len());
    }

    #[test]
    fn test_network_name_by_chain_id() {
        assert_eq!(
            network_name_by_chain_id(&ChainId::new("eip155", "42161")),
            Some("arbitrum")
        );
        assert!(network_name_by_chain_id(&ChainId::new("eip155", "5")).is_none());
    }

    #[test]
    fn test_descriptor_without_default_rpc() {
        let pow = KNOWN_NETWORKS
            .iter()
            .find(|n| n.name == "ethereum-pow")
            .unwrap();
        assert!(pow.descriptor().rpc_url.is_none());
    }
}
