//! Fee parameter selection.
//!
//! A [`FeeParameterProvider`] recommends all four fee numbers for a transfer.
//! The [`FeeStrategySelector`] keeps the ones matching the chain's fee model:
//! `gasPrice` for legacy chains, `maxFeePerGas` + `maxPriorityFeePerGas` for
//! EIP-1559 chains. The gas limit is kept either way.

use alloy_primitives::U256;
use async_trait::async_trait;
use evm_pay_types::amount::{from_hex, hex_quantity, to_hex};
use evm_pay_types::chain::ChainDescriptor;
use evm_pay_types::failure::FailureKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::capability::{CapabilityError, ChainCapabilityResolver, FeeModel};
use crate::rpc::{JsonRpcClient, RpcError};

/// What is being transferred. Providers usually recommend a larger gas limit
/// for token transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferKind {
    Native,
    Erc20,
}

/// Fee recommendation as strings, hex (`"0x5208"`) or decimal (`"21000"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeParameters {
    pub gas_limit: String,
    pub gas_price: String,
    pub max_fee_per_gas: String,
    pub max_priority_fee_per_gas: String,
}

impl RawFeeParameters {
    pub fn from_quantities(
        gas_limit: U256,
        gas_price: U256,
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    ) -> Self {
        Self {
            gas_limit: to_hex(gas_limit),
            gas_price: to_hex(gas_price),
            max_fee_per_gas: to_hex(max_fee_per_gas),
            max_priority_fee_per_gas: to_hex(max_priority_fee_per_gas),
        }
    }

    /// Keeps the values the fee model needs.
    pub fn for_model(&self, model: FeeModel) -> Result<FeeParameters, FeeSelectionError> {
        let gas_limit = parse_quantity("gasLimit", &self.gas_limit)?;
        Ok(match model {
            FeeModel::Legacy => FeeParameters::Legacy {
                gas_limit,
                gas_price: parse_quantity("gasPrice", &self.gas_price)?,
            },
            FeeModel::Eip1559 => FeeParameters::Eip1559 {
                gas_limit,
                max_fee_per_gas: parse_quantity("maxFeePerGas", &self.max_fee_per_gas)?,
                max_priority_fee_per_gas: parse_quantity(
                    "maxPriorityFeePerGas",
                    &self.max_priority_fee_per_gas,
                )?,
            },
        })
    }
}

fn parse_quantity(field: &'static str, value: &str) -> Result<U256, FeeSelectionError> {
    let value = value.trim();
    let parsed = if value.starts_with("0x") || value.starts_with("0X") {
        from_hex(value).ok()
    } else if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        U256::from_str_radix(value, 10).ok()
    } else {
        None
    };
    parsed.ok_or_else(|| FeeSelectionError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

/// Fee fields of a transaction. Exactly one fee model is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feeModel", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FeeParameters {
    Legacy {
        #[serde(with = "hex_quantity")]
        gas_limit: U256,
        #[serde(with = "hex_quantity")]
        gas_price: U256,
    },
    Eip1559 {
        #[serde(with = "hex_quantity")]
        gas_limit: U256,
        #[serde(with = "hex_quantity")]
        max_fee_per_gas: U256,
        #[serde(with = "hex_quantity")]
        max_priority_fee_per_gas: U256,
    },
}

impl FeeParameters {
    pub fn model(&self) -> FeeModel {
        match self {
            FeeParameters::Legacy { .. } => FeeModel::Legacy,
            FeeParameters::Eip1559 { .. } => FeeModel::Eip1559,
        }
    }

    pub fn gas_limit(&self) -> U256 {
        match self {
            FeeParameters::Legacy { gas_limit, .. } | FeeParameters::Eip1559 { gas_limit, .. } => {
                *gas_limit
            }
        }
    }

    pub fn gas_price(&self) -> Option<U256> {
        match self {
            FeeParameters::Legacy { gas_price, .. } => Some(*gas_price),
            FeeParameters::Eip1559 { .. } => None,
        }
    }

    pub fn max_fee_per_gas(&self) -> Option<U256> {
        match self {
            FeeParameters::Eip1559 {
                max_fee_per_gas, ..
            } => Some(*max_fee_per_gas),
            FeeParameters::Legacy { .. } => None,
        }
    }

    pub fn max_priority_fee_per_gas(&self) -> Option<U256> {
        match self {
            FeeParameters::Eip1559 {
                max_priority_fee_per_gas,
                ..
            } => Some(*max_priority_fee_per_gas),
            FeeParameters::Legacy { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeeProviderError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("RPC URL is missing for chain {0}")]
    MissingRpcUrl(String),
    #[error("{0}")]
    Unavailable(String),
}

/// Source of recommended fee parameters, typically the signing boundary.
#[async_trait]
pub trait FeeParameterProvider: Send + Sync {
    async fn fee_parameters(
        &self,
        chain: &ChainDescriptor,
        kind: TransferKind,
    ) -> Result<RawFeeParameters, FeeProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FeeSelectionError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("Fee provider failed: {0}")]
    Provider(#[from] FeeProviderError),
    #[error("Invalid {field} value {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

impl From<FeeSelectionError> for FailureKind {
    fn from(value: FeeSelectionError) -> Self {
        match value {
            FeeSelectionError::Capability(e) => e.into(),
            e => FailureKind::FeeParametersUnavailable(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct FeeStrategySelector {
    provider: Arc<dyn FeeParameterProvider>,
    resolver: ChainCapabilityResolver,
}

impl FeeStrategySelector {
    pub fn new(provider: Arc<dyn FeeParameterProvider>, resolver: ChainCapabilityResolver) -> Self {
        Self { provider, resolver }
    }

    pub fn resolver(&self) -> &ChainCapabilityResolver {
        &self.resolver
    }

    /// Picks the fee parameters for a transfer on `chain`.
    ///
    /// The fee model is resolved first, so a chain without an RPC endpoint fails
    /// before the provider is asked. `fee_override` replaces the provider's
    /// recommendation but never the fee model.
    pub async fn select(
        &self,
        chain: &ChainDescriptor,
        kind: TransferKind,
        fee_override: Option<&RawFeeParameters>,
    ) -> Result<FeeParameters, FeeSelectionError> {
        let model = self.resolver.resolve(chain).await?;
        let fees = match fee_override {
            Some(raw) => raw.for_model(model)?,
            None => {
                let raw = self.provider.fee_parameters(chain, kind).await?;
                raw.for_model(model)?
            }
        };
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.id, ?kind, model = %fees.model(), gas_limit = %fees.gas_limit(), "Selected fee parameters");
        Ok(fees)
    }
}

/// Fee provider backed by the chain's own JSON-RPC endpoint.
///
/// `maxFeePerGas` is twice the current gas price, leaving room for base fee growth.
#[derive(Clone, Debug)]
pub struct RpcFeeProvider {
    client: JsonRpcClient,
    native_gas_limit: U256,
    erc20_gas_limit: U256,
}

impl RpcFeeProvider {
    pub const NATIVE_TRANSFER_GAS: u64 = 21_000;
    pub const ERC20_TRANSFER_GAS: u64 = 100_000;

    pub fn new(client: JsonRpcClient) -> Self {
        Self {
            client,
            native_gas_limit: U256::from(Self::NATIVE_TRANSFER_GAS),
            erc20_gas_limit: U256::from(Self::ERC20_TRANSFER_GAS),
        }
    }
}

#[async_trait]
impl FeeParameterProvider for RpcFeeProvider {
    async fn fee_parameters(
        &self,
        chain: &ChainDescriptor,
        kind: TransferKind,
    ) -> Result<RawFeeParameters, FeeProviderError> {
        let rpc_url = chain
            .rpc_url
            .as_ref()
            .ok_or_else(|| FeeProviderError::MissingRpcUrl(chain.id.to_string()))?;
        let gas_price = self.client.gas_price(rpc_url).await?;
        // Pre-London nodes reject eth_maxPriorityFeePerGas; the value is unused there.
        let priority = match self.client.max_priority_fee_per_gas(rpc_url).await {
            Ok(priority) => priority,
            Err(e) if e.is_error_response() => U256::ZERO,
            Err(e) => return Err(e.into()),
        };
        let gas_limit = match kind {
            TransferKind::Native => self.native_gas_limit,
            TransferKind::Erc20 => self.erc20_gas_limit,
        };
        Ok(RawFeeParameters::from_quantities(
            gas_limit,
            gas_price,
            gas_price.saturating_mul(U256::from(2u8)),
            priority,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::tests::{StaticProbe, chain};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        raw: RawFeeParameters,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                raw: RawFeeParameters {
                    gas_limit: "21000".into(),
                    gas_price: "0x12a05f200".into(),
                    max_fee_per_gas: "0x2540be400".into(),
                    max_priority_fee_per_gas: "1500000000".into(),
                },
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FeeParameterProvider for FixedProvider {
        async fn fee_parameters(
            &self,
            _chain: &ChainDescriptor,
            _kind: TransferKind,
        ) -> Result<RawFeeParameters, FeeProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.raw.clone())
        }
    }

    fn selector(provider: Arc<FixedProvider>, probe_answer: bool) -> FeeStrategySelector {
        FeeStrategySelector::new(
            provider,
            ChainCapabilityResolver::with_probe(StaticProbe::answering(probe_answer)),
        )
    }

    #[tokio::test]
    async fn test_select_eip1559() {
        let fees = selector(FixedProvider::new(), true)
            .select(&chain("1", Some("https://eth.example")), TransferKind::Native, None)
            .await
            .unwrap();
        assert_eq!(
            fees,
            FeeParameters::Eip1559 {
                gas_limit: U256::from(21_000u64),
                max_fee_per_gas: U256::from(10_000_000_000u64),
                max_priority_fee_per_gas: U256::from(1_500_000_000u64),
            }
        );
        assert_eq!(fees.gas_price(), None);
    }

    #[tokio::test]
    async fn test_select_legacy_off_list() {
        let fees = selector(FixedProvider::new(), true)
            .select(&chain("56", Some("https://bsc.example")), TransferKind::Erc20, None)
            .await
            .unwrap();
        assert_eq!(
            fees,
            FeeParameters::Legacy {
                gas_limit: U256::from(21_000u64),
                gas_price: U256::from(5_000_000_000u64),
            }
        );
        assert_eq!(fees.max_fee_per_gas(), None);
        assert_eq!(fees.max_priority_fee_per_gas(), None);
    }

    #[tokio::test]
    async fn test_missing_rpc_fails_before_provider() {
        let provider = FixedProvider::new();
        let err = selector(provider.clone(), true)
            .select(&chain("1", None), TransferKind::Native, None)
            .await
            .unwrap_err();
        assert_eq!(
            FailureKind::from(err),
            FailureKind::MissingRpcUrl("eip155:1".into())
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_override_replaces_provider() {
        let provider = FixedProvider::new();
        let custom = RawFeeParameters {
            gas_limit: "0x186a0".into(),
            gas_price: "3000000000".into(),
            max_fee_per_gas: "0".into(),
            max_priority_fee_per_gas: "0".into(),
        };
        let fees = selector(provider.clone(), false)
            .select(
                &chain("1", Some("https://eth.example")),
                TransferKind::Erc20,
                Some(&custom),
            )
            .await
            .unwrap();
        assert_eq!(
            fees,
            FeeParameters::Legacy {
                gas_limit: U256::from(100_000u64),
                gas_price: U256::from(3_000_000_000u64),
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_quantity() {
        let raw = RawFeeParameters {
            gas_limit: "21000".into(),
            gas_price: "1.5 gwei".into(),
            max_fee_per_gas: "".into(),
            max_priority_fee_per_gas: "".into(),
        };
        let err = raw.for_model(FeeModel::Legacy).unwrap_err();
        assert!(matches!(
            err,
            FeeSelectionError::InvalidValue {
                field: "gasPrice",
                ..
            }
        ));
        assert!(matches!(
            FailureKind::from(err),
            FailureKind::FeeParametersUnavailable(_)
        ));
    }

    #[test]
    fn test_fee_parameters_serialize_hex() {
        let fees = FeeParameters::Legacy {
            gas_limit: U256::from(21_000u64),
            gas_price: U256::from(5_000_000_000u64),
        };
        assert_eq!(
            serde_json::to_value(fees).unwrap(),
            serde_json::json!({"feeModel": "legacy", "gasLimit": "0x5208", "gasPrice": "0x12a05f200"})
        );
    }

    #[tokio::test]
    async fn test_rpc_provider_on_pre_london_node() {
        use serde_json::json;
        use wiremock::matchers::{body_partial_json, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "eth_gasPrice"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"jsonrpc": "2.0", "id": 0, "result": "0xb2d05e00"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "eth_maxPriorityFeePerGas"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 0,
                "error": {"code": -32601, "message": "the method eth_maxPriorityFeePerGas does not exist"}
            })))
            .mount(&server)
            .await;

        let raw = RpcFeeProvider::new(JsonRpcClient::new())
            .fee_parameters(&chain("56", Some(&server.uri())), TransferKind::Erc20)
            .await
            .unwrap();
        assert_eq!(
            raw.for_model(FeeModel::Legacy).unwrap(),
            FeeParameters::Legacy {
                gas_limit: U256::from(100_000u64),
                gas_price: U256::from(3_000_000_000u64),
            }
        );
        assert_eq!(raw.max_priority_fee_per_gas, "0x0");
    }
}
