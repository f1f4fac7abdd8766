//! Signing boundary that prints instead of signing.
//!
//! Every submitted request is written to stdout as the `eth_sendTransaction`
//! call a wallet would receive, then accepted with the next session request id.

use async_trait::async_trait;
use evm_pay_eip155::fee::{FeeParameterProvider, FeeProviderError, RawFeeParameters, TransferKind};
use evm_pay_eip155::transfer::TransferRequest;
use evm_pay_eip155::wallet_request::WalletTransaction;
use evm_pay_orchestrator::boundary::{BoundaryError, Credentials, SentRequest, SigningBoundary, Submission};
use evm_pay_types::chain::{ChainDescriptor, ChainId};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct DryRunBoundary {
    fees: HashMap<ChainId, RawFeeParameters>,
    next_request_id: AtomicU64,
}

impl DryRunBoundary {
    pub fn new(fees: HashMap<ChainId, RawFeeParameters>, first_request_id: u64) -> Self {
        Self {
            fees,
            next_request_id: AtomicU64::new(first_request_id),
        }
    }

    fn render(request: &TransferRequest) -> Result<String, BoundaryError> {
        let call = json!({
            "method": "eth_sendTransaction",
            "params": [WalletTransaction::from(request)],
        });
        serde_json::to_string_pretty(&call).map_err(|e| BoundaryError::Failed(e.to_string()))
    }
}

#[async_trait]
impl FeeParameterProvider for DryRunBoundary {
    async fn fee_parameters(
        &self,
        chain: &ChainDescriptor,
        _kind: TransferKind,
    ) -> Result<RawFeeParameters, FeeProviderError> {
        self.fees.get(&chain.id).cloned().ok_or_else(|| {
            FeeProviderError::Unavailable(format!(
                "no fees configured for {}, add them under \"fees\" or pass --live-fees",
                chain.id
            ))
        })
    }
}

#[async_trait]
impl SigningBoundary for DryRunBoundary {
    async fn submit(
        &self,
        credentials: &Credentials,
        request: TransferRequest,
    ) -> Result<Submission, BoundaryError> {
        let rendered = Self::render(&request)?;
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        tracing::info!(request_id, access_key = %credentials.access_key, kind = ?request.kind(), "Dry-run submission");
        println!("{rendered}");

        let (submission, result) = Submission::accepted();
        let _ = result.send(Ok(SentRequest { request_id }));
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address};
    use evm_pay_eip155::fee::FeeParameters;
    use evm_pay_eip155::transfer::TransferRequestBuilder;
    use evm_pay_types::util::money_amount::MoneyAmount;

    fn bsc() -> ChainDescriptor {
        ChainDescriptor::new(ChainId::new("eip155", "56"), "BNB Smart Chain", None)
    }

    #[tokio::test]
    async fn test_fees_per_chain() {
        let raw = RawFeeParameters::from_quantities(
            U256::from(21_000u64),
            U256::from(1u64),
            U256::from(2u64),
            U256::from(1u64),
        );
        let boundary = DryRunBoundary::new(HashMap::from([(bsc().id, raw.clone())]), 1);
        let fees = boundary.fee_parameters(&bsc(), TransferKind::Native).await.unwrap();
        assert_eq!(fees, raw);

        let ethereum = ChainDescriptor::new(ChainId::new("eip155", "1"), "Ethereum", None);
        assert!(matches!(
            boundary.fee_parameters(&ethereum, TransferKind::Native).await,
            Err(FeeProviderError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_submissions_get_increasing_ids() {
        let boundary = DryRunBoundary::new(HashMap::new(), 42);
        let credentials = Credentials::new("ak", "sk");
        for expected in [42, 43] {
            let request = TransferRequestBuilder::build_native(
                address!("0x1111111111111111111111111111111111111111"),
                "0x2222222222222222222222222222222222222222",
                &MoneyAmount::parse("0.5").unwrap(),
                FeeParameters::Legacy {
                    gas_limit: U256::from(21_000u64),
                    gas_price: U256::from(1u64),
                },
            )
            .unwrap();
            let submission = boundary.submit(&credentials, request).await.unwrap();
            assert!(submission.status.is_ok());
            let sent = submission.result.await.unwrap().unwrap();
            assert_eq!(sent.request_id, expected);
        }
    }
}
