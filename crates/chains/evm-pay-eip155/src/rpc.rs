//! Read-only node access for the calls the orchestrator makes.
//!
//! [`JsonRpcClient`] talks to whichever endpoint a chain is configured with, so
//! every call takes the RPC URL explicitly and connects an alloy provider over
//! a shared HTTP client. It covers:
//!
//! - `eth_getBlockByNumber` - whether the chain has a London base fee (EIP-1559 probe)
//! - `eth_gasPrice` / `eth_maxPriorityFeePerGas` - live fee suggestions
//! - `eth_getTransactionReceipt` - confirmation lookups
//! - `eth_getTransactionByHash` - transaction details
//!
//! Errors keep the request context (`"eth_gasPrice"`) so failures are traceable.

use alloy_primitives::{TxHash, U256};
use alloy_network::ReceiptResponse;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{BlockNumberOrTag, Transaction, TransactionReceipt};
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("RPC call failed: {context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("Empty JSON-RPC result: {context}")]
    EmptyResult { context: &'static str },
}

impl RpcError {
    /// The node answered with a JSON-RPC error object, e.g. an unsupported method.
    pub fn is_error_response(&self) -> bool {
        match self {
            RpcError::Transport { source, .. } => source.as_error_resp().is_some(),
            _ => false,
        }
    }

    fn transport(context: &'static str) -> impl FnOnce(TransportError) -> RpcError {
        move |source| {
            #[cfg(feature = "telemetry")]
            tracing::warn!(method = context, error = %source, "RPC call failed");
            RpcError::Transport { context, source }
        }
    }
}

/// The receipt fields needed to decide whether a transaction landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` for a reverted transaction.
    pub status: bool,
}

impl ReceiptSummary {
    /// Mined and not reverted.
    pub fn is_confirmed(&self) -> bool {
        self.block_number.is_some() && self.status
    }
}

impl From<&TransactionReceipt> for ReceiptSummary {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            status: receipt.status(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JsonRpcClient {
    http: Client,
    timeout: Option<Duration>,
}

impl Default for JsonRpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRpcClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            timeout: None,
        }
    }

    /// A client whose requests give up after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Result<Self, RpcError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RpcError::ClientBuild)?;
        Ok(Self {
            http,
            timeout: Some(timeout),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn provider(&self, rpc_url: &Url) -> impl Provider + use<> {
        let transport = Http::with_client(self.http.clone(), rpc_url.clone());
        let client = RpcClient::new(transport, false);
        ProviderBuilder::default().connect_client(client)
    }

    /// Whether the latest block carries `baseFeePerGas`, i.e. the chain runs the
    /// London fee market.
    pub async fn supports_base_fee(&self, rpc_url: &Url) -> Result<bool, RpcError> {
        let context = "eth_getBlockByNumber";
        let block = self
            .provider(rpc_url)
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(RpcError::transport(context))?
            .ok_or(RpcError::EmptyResult { context })?;
        Ok(block.header.base_fee_per_gas.is_some())
    }

    pub async fn gas_price(&self, rpc_url: &Url) -> Result<U256, RpcError> {
        let price = self
            .provider(rpc_url)
            .get_gas_price()
            .await
            .map_err(RpcError::transport("eth_gasPrice"))?;
        Ok(U256::from(price))
    }

    pub async fn max_priority_fee_per_gas(&self, rpc_url: &Url) -> Result<U256, RpcError> {
        let fee = self
            .provider(rpc_url)
            .get_max_priority_fee_per_gas()
            .await
            .map_err(RpcError::transport("eth_maxPriorityFeePerGas"))?;
        Ok(U256::from(fee))
    }

    /// `None` while the transaction is unknown or pending.
    pub async fn transaction_receipt(
        &self,
        rpc_url: &Url,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptSummary>, RpcError> {
        let receipt = self
            .provider(rpc_url)
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(RpcError::transport("eth_getTransactionReceipt"))?;
        Ok(receipt.as_ref().map(ReceiptSummary::from))
    }

    pub async fn transaction_confirmed(
        &self,
        rpc_url: &Url,
        tx_hash: TxHash,
    ) -> Result<bool, RpcError> {
        let receipt = self.transaction_receipt(rpc_url, tx_hash).await?;
        Ok(receipt.is_some_and(|receipt| receipt.is_confirmed()))
    }

    /// Full transaction details; `None` when the node does not know the hash.
    pub async fn transaction(
        &self,
        rpc_url: &Url,
        tx_hash: TxHash,
    ) -> Result<Option<Transaction>, RpcError> {
        self.provider(rpc_url)
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(RpcError::transport("eth_getTransactionByHash"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use alloy_transport::TransportErrorKind;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const TX: TxHash = b256!("0x6f2b1c4c7d8e9fa0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e2f3a4");
    const BLOCK_HASH: &str = "0x88e96d4537bea4d9c05d12549907b32561d3bf31f45aae734cdc119f13406cb6";
    const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

    /// Answers a JSON-RPC call, echoing the request id.
    struct Reply(Value);

    impl Respond for Reply {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let id = serde_json::from_slice::<Value>(&request.body)
                .ok()
                .and_then(|body| body.get("id").cloned())
                .unwrap_or(json!(0));
            let mut body = self.0.clone();
            body["jsonrpc"] = json!("2.0");
            body["id"] = id;
            ResponseTemplate::new(200).set_body_json(body)
        }
    }

    async fn mock_result(server: &MockServer, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": rpc_method})))
            .respond_with(Reply(json!({ "result": result })))
            .mount(server)
            .await;
    }

    fn url(server: &MockServer) -> Url {
        server.uri().parse().unwrap()
    }

    fn logs_bloom() -> String {
        format!("0x{}", "0".repeat(512))
    }

    fn block(base_fee: Option<&str>) -> Value {
        let mut block = json!({
            "hash": BLOCK_HASH,
            "parentHash": ZERO_HASH,
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": "0x0000000000000000000000000000000000000000",
            "stateRoot": ZERO_HASH,
            "transactionsRoot": ZERO_HASH,
            "receiptsRoot": ZERO_HASH,
            "logsBloom": logs_bloom(),
            "difficulty": "0x0",
            "number": "0x10",
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x0",
            "timestamp": "0x6553f100",
            "extraData": "0x",
            "mixHash": ZERO_HASH,
            "nonce": "0x0000000000000000",
            "size": "0x220",
            "uncles": [],
            "transactions": []
        });
        if let Some(base_fee) = base_fee {
            block["baseFeePerGas"] = json!(base_fee);
        }
        block
    }

    fn receipt(status: &str) -> Value {
        json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": logs_bloom(),
            "transactionHash": TX,
            "transactionIndex": "0x0",
            "blockHash": BLOCK_HASH,
            "blockNumber": "0x1b4",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "contractAddress": null
        })
    }

    #[tokio::test]
    async fn test_supports_base_fee_london_block() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_getBlockByNumber", block(Some("0x3b9aca00"))).await;
        let client = JsonRpcClient::new();
        assert!(client.supports_base_fee(&url(&server)).await.unwrap());
    }

    #[tokio::test]
    async fn test_supports_base_fee_legacy_block() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_getBlockByNumber", block(None)).await;
        let client = JsonRpcClient::new();
        assert!(!client.supports_base_fee(&url(&server)).await.unwrap());
    }

    #[tokio::test]
    async fn test_null_block_is_an_error() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_getBlockByNumber", Value::Null).await;
        let err = JsonRpcClient::new()
            .supports_base_fee(&url(&server))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::EmptyResult { .. }));
    }

    #[tokio::test]
    async fn test_json_rpc_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(Reply(json!({
                "error": {"code": -32601, "message": "method not found"}
            })))
            .mount(&server)
            .await;
        let err = JsonRpcClient::new()
            .max_priority_fee_per_gas(&url(&server))
            .await
            .unwrap_err();
        assert!(err.is_error_response());
        match err {
            RpcError::Transport { context, source } => {
                assert_eq!(context, "eth_maxPriorityFeePerGas");
                let payload = source.as_error_resp().unwrap();
                assert_eq!(payload.code, -32601);
                assert_eq!(payload.message, "method not found");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        let err = JsonRpcClient::new()
            .with_timeout(Duration::from_secs(5))
            .unwrap()
            .gas_price(&url(&server))
            .await
            .unwrap_err();
        assert!(!err.is_error_response());
        match err {
            RpcError::Transport {
                source: alloy_transport::RpcError::Transport(TransportErrorKind::HttpError(e)),
                ..
            } => {
                assert_eq!(e.status, 503);
                assert_eq!(e.body, "overloaded");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gas_price() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_gasPrice", json!("0x12a05f200")).await;
        let price = JsonRpcClient::new().gas_price(&url(&server)).await.unwrap();
        assert_eq!(price, U256::from(5_000_000_000u64));
    }

    #[tokio::test]
    async fn test_transaction_confirmed() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_getTransactionReceipt", receipt("0x1")).await;
        let client = JsonRpcClient::new();
        let summary = client
            .transaction_receipt(&url(&server), TX)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.transaction_hash, TX);
        assert_eq!(summary.block_number, Some(0x1b4));
        assert!(client.transaction_confirmed(&url(&server), TX).await.unwrap());
    }

    #[tokio::test]
    async fn test_transaction_reverted_or_pending() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_getTransactionReceipt", receipt("0x0")).await;
        let client = JsonRpcClient::new();
        assert!(!client.transaction_confirmed(&url(&server), TX).await.unwrap());

        let pending = MockServer::start().await;
        mock_result(&pending, "eth_getTransactionReceipt", Value::Null).await;
        assert!(!client.transaction_confirmed(&url(&pending), TX).await.unwrap());
    }

    #[tokio::test]
    async fn test_transaction_details() {
        let server = MockServer::start().await;
        mock_result(
            &server,
            "eth_getTransactionByHash",
            json!({
                "type": "0x2",
                "chainId": "0x1",
                "nonce": "0x7",
                "gas": "0x5208",
                "maxFeePerGas": "0x77359400",
                "maxPriorityFeePerGas": "0x3b9aca00",
                "to": "0x2222222222222222222222222222222222222222",
                "value": "0xde0b6b3a7640000",
                "accessList": [],
                "input": "0x",
                "r": "0x1b5e176d927f8e9ab405058b2d2457392da3e20f328b16ddabcebc33eaac5fea",
                "s": "0x4ba69724e8f69de52f0125ad8b3c5c2cef33019bac3249e2c0a2192766d1721c",
                "yParity": "0x0",
                "v": "0x0",
                "hash": TX,
                "blockHash": BLOCK_HASH,
                "blockNumber": "0x1b4",
                "transactionIndex": "0x0",
                "from": "0x1111111111111111111111111111111111111111",
                "gasPrice": "0x3b9aca00"
            }),
        )
        .await;
        let client = JsonRpcClient::new();
        let tx = client.transaction(&url(&server), TX).await.unwrap().unwrap();
        assert_eq!(tx.block_number, Some(0x1b4));
        assert_eq!(
            tx.inner.signer(),
            address!("0x1111111111111111111111111111111111111111")
        );

        let unknown = MockServer::start().await;
        mock_result(&unknown, "eth_getTransactionByHash", Value::Null).await;
        assert!(client.transaction(&url(&unknown), TX).await.unwrap().is_none());
    }
}
