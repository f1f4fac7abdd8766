//! Projection of a [`TransferRequest`] onto `eth_sendTransaction` parameters.
//!
//! Signing-boundary adapters that relay requests to a wallet over JSON-RPC use
//! [`WalletTransaction`]. A native transfer sends `value` to the recipient; an
//! ERC20 transfer becomes a zero-value call to the token contract carrying
//! `transfer(recipient, amount)` calldata.

use alloy_primitives::{Bytes, U256};
use evm_pay_types::amount::to_hex;
use serde::Serialize;

use crate::chain::{ChecksummedAddress, erc20};
use crate::fee::FeeParameters;
use crate::transfer::TransferRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub from: ChecksummedAddress,
    pub to: ChecksummedAddress,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    pub gas: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
}

impl WalletTransaction {
    fn with_fees(
        from: ChecksummedAddress,
        to: ChecksummedAddress,
        value: U256,
        data: Option<Bytes>,
        fees: &FeeParameters,
    ) -> Self {
        Self {
            from,
            to,
            value: to_hex(value),
            data,
            gas: to_hex(fees.gas_limit()),
            gas_price: fees.gas_price().map(to_hex),
            max_fee_per_gas: fees.max_fee_per_gas().map(to_hex),
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas().map(to_hex),
        }
    }
}

impl From<&TransferRequest> for WalletTransaction {
    fn from(request: &TransferRequest) -> Self {
        let fees = request.fees();
        let from = ChecksummedAddress(request.from_address());
        match request {
            TransferRequest::NativeLegacy { to, value, .. }
            | TransferRequest::NativeEip1559 { to, value, .. } => {
                WalletTransaction::with_fees(from, *to, *value, None, &fees)
            }
            TransferRequest::Erc20 {
                to, amount, token, ..
            } => {
                let data = erc20::transfer_calldata(to.0, *amount);
                WalletTransaction::with_fees(
                    from,
                    token.contract_address,
                    U256::ZERO,
                    Some(data),
                    &fees,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::{KnownNetworkEip155, USDT};
    use crate::transfer::TransferRequestBuilder;
    use alloy_primitives::address;
    use evm_pay_types::chain::{ChainDescriptor, ChainId};
    use evm_pay_types::util::money_amount::MoneyAmount;

    #[test]
    fn test_native_eip1559_params() {
        let request = TransferRequestBuilder::build_native(
            address!("0x1111111111111111111111111111111111111111"),
            "0xcBa852Ef29a43a7542B88F60C999eD9cB66f6000",
            &MoneyAmount::parse("0.5").unwrap(),
            FeeParameters::Eip1559 {
                gas_limit: U256::from(21_000u64),
                max_fee_per_gas: U256::from(10_000_000_000u64),
                max_priority_fee_per_gas: U256::from(1_000_000_000u64),
            },
        )
        .unwrap();
        let params = serde_json::to_value(WalletTransaction::from(&request)).unwrap();
        assert_eq!(
            params,
            serde_json::json!({
                "from": "0x1111111111111111111111111111111111111111",
                "to": "0xcBa852Ef29a43a7542B88F60C999eD9cB66f6000",
                "value": "0x6f05b59d3b20000",
                "gas": "0x5208",
                "maxFeePerGas": "0x2540be400",
                "maxPriorityFeePerGas": "0x3b9aca00"
            })
        );
    }

    #[test]
    fn test_erc20_calls_token_contract() {
        let bsc = ChainDescriptor::new(ChainId::new("eip155", "56"), "BNB Smart Chain", None);
        let token = USDT::bsc().on(bsc.clone());
        let request = TransferRequestBuilder::build_erc20(
            address!("0x1111111111111111111111111111111111111111"),
            "0x2222222222222222222222222222222222222222",
            &MoneyAmount::parse("10.5").unwrap(),
            &token,
            &bsc,
            FeeParameters::Legacy {
                gas_limit: U256::from(60_000u64),
                gas_price: U256::from(3_000_000_000u64),
            },
        )
        .unwrap();
        let tx = WalletTransaction::from(&request);
        assert_eq!(tx.to, token.contract_address);
        assert_eq!(tx.value, "0x0");
        assert_eq!(tx.gas, "0xea60");
        assert_eq!(tx.gas_price.as_deref(), Some("0xb2d05e00"));
        assert!(tx.max_fee_per_gas.is_none());
        let data = tx.data.unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(U256::from_be_slice(&data[36..]), U256::from(10_500_000u64));
    }
}
