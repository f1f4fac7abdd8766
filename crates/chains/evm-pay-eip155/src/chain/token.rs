//! ERC20 tokens a payment can be denominated in.

use alloy_primitives::U256;
use evm_pay_types::amount::{AmountError, parse_minor_units, to_minor_units};
use evm_pay_types::chain::{ChainDescriptor, ChainId, ChainRegistry};
use evm_pay_types::util::money_amount::MoneyAmount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::chain::ChecksummedAddress;
use crate::networks::TokenPreset;

/// An ERC20 token deployment on a specific chain.
///
/// `decimals` is trusted as configured; nothing queries the contract for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Token {
    pub chain: ChainDescriptor,
    pub symbol: String,
    pub contract_address: ChecksummedAddress,
    pub decimals: u8,
}

impl Erc20Token {
    /// Scales a human amount into the token's smallest unit.
    ///
    /// ```
    /// use alloy_primitives::U256;
    /// use evm_pay_eip155::chain::Erc20Token;
    /// use evm_pay_types::chain::{ChainDescriptor, ChainId};
    ///
    /// let usdt = Erc20Token {
    ///     chain: ChainDescriptor::new(ChainId::new("eip155", "56"), "BNB Smart Chain", None),
    ///     symbol: "USDT".into(),
    ///     contract_address: "0x55d398326f99059fF775485246999027B3197955".parse().unwrap(),
    ///     decimals: 6,
    /// };
    /// assert_eq!(usdt.parse("10.5").unwrap(), U256::from(10_500_000u64));
    /// ```
    pub fn parse(&self, amount: &str) -> Result<U256, AmountError> {
        parse_minor_units(amount, self.decimals)
    }

    pub fn minor_units(&self, amount: &MoneyAmount) -> Result<U256, AmountError> {
        to_minor_units(amount, self.decimals)
    }
}

/// Configured tokens, looked up by chain and symbol.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry(HashMap<(ChainId, String), Erc20Token>);

impl TokenRegistry {
    /// Builds a registry from presets, keeping only those whose chain is configured.
    pub fn from_presets<'a, I>(presets: I, chains: &ChainRegistry) -> Self
    where
        I: IntoIterator<Item = &'a TokenPreset>,
    {
        presets
            .into_iter()
            .filter_map(|preset| {
                let chain = chains.by_chain_id(&preset.chain_reference.as_chain_id())?;
                Some(preset.on(chain.clone()))
            })
            .collect()
    }

    pub fn insert(&mut self, token: Erc20Token) -> Option<Erc20Token> {
        let key = (token.chain.id.clone(), token.symbol.to_uppercase());
        self.0.insert(key, token)
    }

    /// Symbol lookup is case-insensitive.
    pub fn get(&self, chain_id: &ChainId, symbol: &str) -> Option<&Erc20Token> {
        self.0.get(&(chain_id.clone(), symbol.to_uppercase()))
    }

    pub fn on_chain<'a>(&'a self, chain_id: &'a ChainId) -> impl Iterator<Item = &'a Erc20Token> {
        self.0.values().filter(move |token| token.chain.id == *chain_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Erc20Token> for TokenRegistry {
    fn from_iter<T: IntoIterator<Item = Erc20Token>>(iter: T) -> Self {
        let mut registry = TokenRegistry::default();
        for token in iter {
            registry.insert(token);
        }
        registry
    }
}
