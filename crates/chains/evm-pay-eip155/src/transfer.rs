//! Transfer requests handed to the signing boundary.
//!
//! A [`TransferRequest`] is built fresh for every payment attempt and consumed
//! by exactly one submission. Building happens in two steps so every check that
//! needs no network runs first:
//!
//! 1. [`TransferRequestBuilder::prepare_native`] / [`TransferRequestBuilder::prepare_erc20`]
//!    validate the recipient, the token's chain and the amount.
//! 2. [`PreparedTransfer::with_fees`] attaches the selected [`FeeParameters`].

use alloy_primitives::{Address, U256};
use evm_pay_types::amount::{AmountError, hex_quantity, to_minor_units};
use evm_pay_types::chain::{ChainDescriptor, ChainId, NATIVE_DECIMALS};
use evm_pay_types::failure::FailureKind;
use evm_pay_types::util::money_amount::MoneyAmount;
use serde::Serialize;

use crate::chain::{ChecksummedAddress, Erc20Token};
use crate::fee::{FeeParameters, TransferKind};

#[derive(Debug, thiserror::Error)]
pub enum TransferBuildError {
    #[error("Account is empty")]
    EmptyRecipient,
    #[error("Malformed recipient address {0:?}")]
    MalformedRecipient(String),
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("Token is deployed on {token_chain} but the wallet is on {wallet_chain}")]
    ChainTokenMismatch {
        token_chain: ChainId,
        wallet_chain: ChainId,
    },
}

impl From<TransferBuildError> for FailureKind {
    fn from(value: TransferBuildError) -> Self {
        match value {
            TransferBuildError::EmptyRecipient | TransferBuildError::MalformedRecipient(_) => {
                FailureKind::InvalidRecipient(value.to_string())
            }
            TransferBuildError::InvalidAmount(e) => FailureKind::InvalidAmount(e.to_string()),
            TransferBuildError::ChainTokenMismatch {
                token_chain,
                wallet_chain,
            } => FailureKind::ChainTokenMismatch {
                token_chain: token_chain.to_string(),
                wallet_chain: wallet_chain.to_string(),
            },
        }
    }
}

/// A transfer ready for signing. All quantities serialize as hex.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransferRequest {
    NativeLegacy {
        from: ChecksummedAddress,
        to: ChecksummedAddress,
        #[serde(with = "hex_quantity")]
        value: U256,
        #[serde(with = "hex_quantity")]
        gas_limit: U256,
        #[serde(with = "hex_quantity")]
        gas_price: U256,
    },
    NativeEip1559 {
        from: ChecksummedAddress,
        to: ChecksummedAddress,
        #[serde(with = "hex_quantity")]
        value: U256,
        #[serde(with = "hex_quantity")]
        gas_limit: U256,
        #[serde(with = "hex_quantity")]
        max_fee_per_gas: U256,
        #[serde(with = "hex_quantity")]
        max_priority_fee_per_gas: U256,
    },
    Erc20 {
        from: ChecksummedAddress,
        /// Recipient of the tokens, not the contract.
        to: ChecksummedAddress,
        /// Token minor units.
        #[serde(with = "hex_quantity")]
        amount: U256,
        token: Erc20Token,
        fees: FeeParameters,
    },
}

impl TransferRequest {
    pub fn kind(&self) -> TransferKind {
        match self {
            TransferRequest::NativeLegacy { .. } | TransferRequest::NativeEip1559 { .. } => {
                TransferKind::Native
            }
            TransferRequest::Erc20 { .. } => TransferKind::Erc20,
        }
    }

    pub fn from_address(&self) -> Address {
        match self {
            TransferRequest::NativeLegacy { from, .. }
            | TransferRequest::NativeEip1559 { from, .. }
            | TransferRequest::Erc20 { from, .. } => from.0,
        }
    }

    pub fn to_address(&self) -> Address {
        match self {
            TransferRequest::NativeLegacy { to, .. }
            | TransferRequest::NativeEip1559 { to, .. }
            | TransferRequest::Erc20 { to, .. } => to.0,
        }
    }

    /// Amount in minor units of the transferred asset.
    pub fn value(&self) -> U256 {
        match self {
            TransferRequest::NativeLegacy { value, .. }
            | TransferRequest::NativeEip1559 { value, .. } => *value,
            TransferRequest::Erc20 { amount, .. } => *amount,
        }
    }

    pub fn fees(&self) -> FeeParameters {
        match self {
            TransferRequest::NativeLegacy {
                gas_limit,
                gas_price,
                ..
            } => FeeParameters::Legacy {
                gas_limit: *gas_limit,
                gas_price: *gas_price,
            },
            TransferRequest::NativeEip1559 {
                gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                ..
            } => FeeParameters::Eip1559 {
                gas_limit: *gas_limit,
                max_fee_per_gas: *max_fee_per_gas,
                max_priority_fee_per_gas: *max_priority_fee_per_gas,
            },
            TransferRequest::Erc20 { fees, .. } => *fees,
        }
    }

    pub fn token(&self) -> Option<&Erc20Token> {
        match self {
            TransferRequest::Erc20 { token, .. } => Some(token),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedAsset {
    Native,
    Erc20(Erc20Token),
}

/// A validated transfer still waiting for its fee parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransfer {
    pub from: ChecksummedAddress,
    pub to: ChecksummedAddress,
    pub amount: MoneyAmount,
    /// `amount` in minor units of the asset.
    pub value: U256,
    pub asset: PreparedAsset,
}

impl PreparedTransfer {
    pub fn kind(&self) -> TransferKind {
        match self.asset {
            PreparedAsset::Native => TransferKind::Native,
            PreparedAsset::Erc20(_) => TransferKind::Erc20,
        }
    }

    /// Asset symbol for display, `None` for the native coin.
    pub fn token_symbol(&self) -> Option<&str> {
        match &self.asset {
            PreparedAsset::Native => None,
            PreparedAsset::Erc20(token) => Some(&token.symbol),
        }
    }

    pub fn with_fees(self, fees: FeeParameters) -> TransferRequest {
        let PreparedTransfer {
            from,
            to,
            value,
            asset,
            ..
        } = self;
        match (asset, fees) {
            (PreparedAsset::Erc20(token), fees) => TransferRequest::Erc20 {
                from,
                to,
                amount: value,
                token,
                fees,
            },
            (
                PreparedAsset::Native,
                FeeParameters::Legacy {
                    gas_limit,
                    gas_price,
                },
            ) => TransferRequest::NativeLegacy {
                from,
                to,
                value,
                gas_limit,
                gas_price,
            },
            (
                PreparedAsset::Native,
                FeeParameters::Eip1559 {
                    gas_limit,
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                },
            ) => TransferRequest::NativeEip1559 {
                from,
                to,
                value,
                gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
            },
        }
    }
}

/// Parses and checks a destination account.
pub fn validate_recipient(to: &str) -> Result<ChecksummedAddress, TransferBuildError> {
    let to = to.trim();
    if to.is_empty() {
        return Err(TransferBuildError::EmptyRecipient);
    }
    let address: ChecksummedAddress = to
        .parse()
        .map_err(|_| TransferBuildError::MalformedRecipient(to.to_string()))?;
    if address.0 == Address::ZERO {
        return Err(TransferBuildError::MalformedRecipient(to.to_string()));
    }
    Ok(address)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransferRequestBuilder;

impl TransferRequestBuilder {
    pub fn prepare_native(
        from: Address,
        to: &str,
        amount: &MoneyAmount,
    ) -> Result<PreparedTransfer, TransferBuildError> {
        let to = validate_recipient(to)?;
        let value = to_minor_units(amount, NATIVE_DECIMALS)?;
        Ok(PreparedTransfer {
            from: from.into(),
            to,
            amount: *amount,
            value,
            asset: PreparedAsset::Native,
        })
    }

    /// Fails with [`TransferBuildError::ChainTokenMismatch`] when the wallet is
    /// connected to a different chain than the one the token lives on.
    pub fn prepare_erc20(
        from: Address,
        to: &str,
        amount: &MoneyAmount,
        token: &Erc20Token,
        current_chain: &ChainDescriptor,
    ) -> Result<PreparedTransfer, TransferBuildError> {
        if token.chain.id != current_chain.id {
            return Err(TransferBuildError::ChainTokenMismatch {
                token_chain: token.chain.id.clone(),
                wallet_chain: current_chain.id.clone(),
            });
        }
        let to = validate_recipient(to)?;
        let value = token.minor_units(amount)?;
        Ok(PreparedTransfer {
            from: from.into(),
            to,
            amount: *amount,
            value,
            asset: PreparedAsset::Erc20(token.clone()),
        })
    }

    pub fn build_native(
        from: Address,
        to: &str,
        amount: &MoneyAmount,
        fees: FeeParameters,
    ) -> Result<TransferRequest, TransferBuildError> {
        Ok(Self::prepare_native(from, to, amount)?.with_fees(fees))
    }

    pub fn build_erc20(
        from: Address,
        to: &str,
        amount: &MoneyAmount,
        token: &Erc20Token,
        current_chain: &ChainDescriptor,
        fees: FeeParameters,
    ) -> Result<TransferRequest, TransferBuildError> {
        Ok(Self::prepare_erc20(from, to, amount, token, current_chain)?.with_fees(fees))
    }
}
