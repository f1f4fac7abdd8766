//! Well-known EVM networks and the stablecoin deployments preset on them.
//!
//! [`KnownNetworkEip155`] is implemented for [`ChainId`] and for the token markers
//! [`USDT`], [`USDC`] and [`DAI`], so both chain ids and token presets can be
//! spelled the same way:
//!
//! ```
//! use evm_pay_eip155::networks::{KnownNetworkEip155, USDT};
//! use evm_pay_types::chain::ChainId;
//!
//! assert_eq!(ChainId::bsc().to_string(), "eip155:56");
//! assert_eq!(USDT::bsc().decimals, 6);
//! ```

use alloy_primitives::address;
use evm_pay_types::chain::{ChainDescriptor, ChainId};

use crate::chain::{ChecksummedAddress, Eip155ChainReference, Erc20Token};

pub trait KnownNetworkEip155<A> {
    /// Ethereum mainnet (eip155:1)
    fn ethereum() -> A;
    /// Optimism (eip155:10)
    fn optimism() -> A;
    /// BNB Smart Chain (eip155:56)
    fn bsc() -> A;
    /// Polygon PoS (eip155:137)
    fn polygon() -> A;
    /// Arbitrum One (eip155:42161)
    fn arbitrum() -> A;
    /// Avalanche C-Chain (eip155:43114)
    fn avalanche() -> A;
}

impl KnownNetworkEip155<ChainId> for ChainId {
    fn ethereum() -> ChainId {
        ChainId::new("eip155", "1")
    }

    fn optimism() -> ChainId {
        ChainId::new("eip155", "10")
    }

    fn bsc() -> ChainId {
        ChainId::new("eip155", "56")
    }

    fn polygon() -> ChainId {
        ChainId::new("eip155", "137")
    }

    fn arbitrum() -> ChainId {
        ChainId::new("eip155", "42161")
    }

    fn avalanche() -> ChainId {
        ChainId::new("eip155", "43114")
    }
}

/// A token deployment known ahead of configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPreset {
    pub chain_reference: Eip155ChainReference,
    pub symbol: &'static str,
    pub address: ChecksummedAddress,
    pub decimals: u8,
}

impl TokenPreset {
    /// Binds the preset to a configured chain.
    pub fn on(&self, chain: ChainDescriptor) -> Erc20Token {
        Erc20Token {
            chain,
            symbol: self.symbol.to_string(),
            contract_address: self.address,
            decimals: self.decimals,
        }
    }
}

const fn preset(
    chain_id: u64,
    symbol: &'static str,
    address: alloy_primitives::Address,
    decimals: u8,
) -> TokenPreset {
    TokenPreset {
        chain_reference: Eip155ChainReference::new(chain_id),
        symbol,
        address: ChecksummedAddress(address),
        decimals,
    }
}

#[allow(clippy::upper_case_acronyms)]
pub struct USDT;
#[allow(clippy::upper_case_acronyms)]
pub struct USDC;
#[allow(clippy::upper_case_acronyms)]
pub struct DAI;

impl KnownNetworkEip155<TokenPreset> for USDT {
    fn ethereum() -> TokenPreset {
        preset(1, "USDT", address!("0xdAC17F958D2ee523a2206206994597C13D831ec7"), 6)
    }

    fn optimism() -> TokenPreset {
        preset(10, "USDT", address!("0x94b008aA00579c1307B0EF2c499aD98a8ce58e58"), 6)
    }

    fn bsc() -> TokenPreset {
        preset(56, "USDT", address!("0x55d398326f99059fF775485246999027B3197955"), 6)
    }

    fn polygon() -> TokenPreset {
        preset(137, "USDT", address!("0x3813e82e6f7098b9583FC0F33a962D02018B6803"), 6)
    }

    fn arbitrum() -> TokenPreset {
        preset(42161, "USDT", address!("0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"), 6)
    }

    fn avalanche() -> TokenPreset {
        preset(43114, "USDT", address!("0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7"), 6)
    }
}

impl KnownNetworkEip155<TokenPreset> for USDC {
    fn ethereum() -> TokenPreset {
        preset(1, "USDC", address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6)
    }

    fn optimism() -> TokenPreset {
        preset(10, "USDC", address!("0x7F5c764cBc14f9669B88837ca1490cCa17c31607"), 6)
    }

    fn bsc() -> TokenPreset {
        preset(56, "USDC", address!("0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"), 6)
    }

    fn polygon() -> TokenPreset {
        preset(137, "USDC", address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"), 6)
    }

    fn arbitrum() -> TokenPreset {
        preset(42161, "USDC", address!("0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8"), 6)
    }

    fn avalanche() -> TokenPreset {
        preset(43114, "USDC", address!("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"), 6)
    }
}

impl KnownNetworkEip155<TokenPreset> for DAI {
    fn ethereum() -> TokenPreset {
        preset(1, "DAI", address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"), 18)
    }

    fn optimism() -> TokenPreset {
        preset(10, "DAI", address!("0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1"), 18)
    }

    fn bsc() -> TokenPreset {
        preset(56, "DAI", address!("0x1AF3F329e8BE154074D8769D1FFa4eE058B1DBc3"), 18)
    }

    fn polygon() -> TokenPreset {
        preset(137, "DAI", address!("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"), 18)
    }

    fn arbitrum() -> TokenPreset {
        preset(42161, "DAI", address!("0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1"), 18)
    }

    fn avalanche() -> TokenPreset {
        preset(43114, "DAI", address!("0xd586E7F844cEa2F87f50152665BCbc2C279D8d70"), 18)
    }
}

fn all_networks<T: KnownNetworkEip155<TokenPreset>>() -> [TokenPreset; 6] {
    [
        T::ethereum(),
        T::optimism(),
        T::bsc(),
        T::polygon(),
        T::arbitrum(),
        T::avalanche(),
    ]
}

/// Every built-in token preset.
pub static PRESET_TOKENS: std::sync::LazyLock<Vec<TokenPreset>> = std::sync::LazyLock::new(|| {
    [all_networks::<USDT>(), all_networks::<USDC>(), all_networks::<DAI>()].concat()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_checksummed() {
        assert_eq!(
            USDC::bsc().address.to_string(),
            "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"
        );
        assert_eq!(
            DAI::arbitrum().address.to_string(),
            "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1"
        );
    }

    #[test]
    fn test_preset_chain_matches_chain_id() {
        assert_eq!(USDT::polygon().chain_reference.as_chain_id(), ChainId::polygon());
        assert_eq!(DAI::avalanche().chain_reference.as_chain_id(), ChainId::avalanche());
        assert_eq!(PRESET_TOKENS.len(), 18);
    }
}
