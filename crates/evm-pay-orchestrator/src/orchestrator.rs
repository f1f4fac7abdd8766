//! Payment attempts from request to order.
//!
//! [`PaymentOrchestrator::pay`] checks every precondition synchronously and
//! returns a [`FailureKind`] without touching the network when one fails.
//! Otherwise the attempt continues on a spawned task:
//!
//! ```text
//! Idle -> AwaitingUserConfirmation -> Submitting -> Accepted | Rejected
//!                                  \-> UserCancelled
//! ```
//!
//! The fee model is resolved only after the user approves, so a declined
//! payment never probes the chain. Nothing is retried.

use alloy_primitives::TxHash;
use dashmap::DashMap;
use evm_pay_eip155::capability::ChainCapabilityResolver;
use evm_pay_eip155::chain::{ChecksummedAddress, Erc20Token};
use evm_pay_eip155::fee::{FeeParameterProvider, FeeStrategySelector, RawFeeParameters};
use evm_pay_eip155::networks::KnownNetworkEip155;
use evm_pay_eip155::rpc::{JsonRpcClient, RpcError};
use evm_pay_eip155::transfer::{PreparedTransfer, TransferRequestBuilder};
use evm_pay_types::chain::{ChainDescriptor, ChainId, ChainRegistry};
use evm_pay_types::failure::FailureKind;
use evm_pay_types::timestamp::UnixTimestamp;
use evm_pay_types::util::money_amount::MoneyAmount;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::boundary::{BoundaryError, Credentials, SigningBoundary};
use crate::session::{
    ConfirmationPrompt, Decision, OrderListener, PayListener, PaymentPrompt, SessionError,
    WalletResponse, WalletSession,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentState {
    Idle,
    AwaitingUserConfirmation,
    Submitting,
    Accepted,
    Rejected,
    UserCancelled,
}

impl PaymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentState::Accepted | PaymentState::Rejected | PaymentState::UserCancelled
        )
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentState::Idle => "idle",
            PaymentState::AwaitingUserConfirmation => "awaiting_user_confirmation",
            PaymentState::Submitting => "submitting",
            PaymentState::Accepted => "accepted",
            PaymentState::Rejected => "rejected",
            PaymentState::UserCancelled => "user_cancelled",
        };
        f.write_str(s)
    }
}

/// An order minted when the wallet session accepts a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub chain: ChainDescriptor,
    pub amount: MoneyAmount,
    pub created_at: UnixTimestamp,
}

impl Order {
    fn mint(request_id: u64, chain: ChainDescriptor, amount: MoneyAmount) -> Self {
        Self {
            order_id: format!("order{request_id}"),
            chain,
            amount,
            created_at: UnixTimestamp::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Accepted(Order),
    Rejected(FailureKind),
    UserCancelled,
}

impl PaymentOutcome {
    /// The minted order, only present on acceptance.
    pub fn order(&self) -> Option<&Order> {
        match self {
            PaymentOutcome::Accepted(order) => Some(order),
            _ => None,
        }
    }

    pub fn state(&self) -> PaymentState {
        match self {
            PaymentOutcome::Accepted(_) => PaymentState::Accepted,
            PaymentOutcome::Rejected(_) => PaymentState::Rejected,
            PaymentOutcome::UserCancelled => PaymentState::UserCancelled,
        }
    }
}

/// A single payment to perform.
///
/// Without a recipient the configured treasury address is paid.
#[derive(Clone)]
pub struct PayRequest {
    pub amount: MoneyAmount,
    pub recipient: Option<String>,
    pub token: Option<Erc20Token>,
    pub fee_override: Option<RawFeeParameters>,
    pub order_title: String,
    pub goods_description: String,
    pub order_listener: Option<Arc<dyn OrderListener>>,
}

impl PayRequest {
    pub fn native(amount: MoneyAmount) -> Self {
        Self {
            amount,
            recipient: None,
            token: None,
            fee_override: None,
            order_title: String::new(),
            goods_description: String::new(),
            order_listener: None,
        }
    }

    pub fn erc20(token: Erc20Token, amount: MoneyAmount) -> Self {
        Self {
            token: Some(token),
            ..Self::native(amount)
        }
    }

    pub fn with_recipient<S: Into<String>>(mut self, recipient: S) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_fee_override(mut self, fees: RawFeeParameters) -> Self {
        self.fee_override = Some(fees);
        self
    }

    pub fn with_order_title<S: Into<String>>(mut self, title: S) -> Self {
        self.order_title = title.into();
        self
    }

    pub fn with_goods_description<S: Into<String>>(mut self, description: S) -> Self {
        self.goods_description = description.into();
        self
    }

    pub fn with_order_listener(mut self, listener: Arc<dyn OrderListener>) -> Self {
        self.order_listener = Some(listener);
        self
    }
}

impl fmt::Debug for PayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayRequest")
            .field("amount", &self.amount)
            .field("recipient", &self.recipient)
            .field("token", &self.token.as_ref().map(|t| &t.symbol))
            .field("fee_override", &self.fee_override)
            .field("order_title", &self.order_title)
            .field("goods_description", &self.goods_description)
            .field("order_listener", &self.order_listener.is_some())
            .finish()
    }
}

/// Handle to an attempt running in the background.
///
/// Dropping it does not cancel the attempt.
#[derive(Debug)]
pub struct PendingPayment {
    handle: JoinHandle<PaymentOutcome>,
    state: watch::Receiver<PaymentState>,
}

impl PendingPayment {
    pub fn state(&self) -> PaymentState {
        *self.state.borrow()
    }

    pub async fn outcome(self) -> PaymentOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => PaymentOutcome::Rejected(FailureKind::BoundaryException(format!(
                "Payment attempt aborted: {e}"
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiptLookupError {
    #[error("No RPC endpoint available for receipt lookup")]
    NoRpcUrl,
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// How long an accepted order waits for its wallet response by default.
pub const DEFAULT_PENDING_ORDER_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
pub struct PaymentOrchestrator {
    session: Arc<dyn WalletSession>,
    prompt: Arc<dyn ConfirmationPrompt>,
    boundary: Arc<dyn SigningBoundary>,
    fees: FeeStrategySelector,
    credentials: Credentials,
    treasury: Option<ChecksummedAddress>,
    pay_listener: Arc<RwLock<Option<Arc<dyn PayListener>>>>,
    pending_orders: Arc<DashMap<u64, Order>>,
    pending_order_ttl: Duration,
    rpc: JsonRpcClient,
    fallback_rpc_url: Option<Url>,
}

impl fmt::Debug for PaymentOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentOrchestrator")
            .field("credentials", &self.credentials)
            .field("treasury", &self.treasury)
            .field("pending_orders", &self.pending_orders.len())
            .finish_non_exhaustive()
    }
}

impl PaymentOrchestrator {
    /// The boundary doubles as the fee parameter provider unless
    /// [`PaymentOrchestrator::with_fee_provider`] replaces it.
    pub fn new<B>(
        session: Arc<dyn WalletSession>,
        prompt: Arc<dyn ConfirmationPrompt>,
        boundary: Arc<B>,
        resolver: ChainCapabilityResolver,
    ) -> Self
    where
        B: SigningBoundary + 'static,
    {
        let provider: Arc<dyn FeeParameterProvider> = boundary.clone();
        let fallback_rpc_url = ChainRegistry::known()
            .by_chain_id(&ChainId::ethereum())
            .and_then(|chain| chain.rpc_url.clone());
        Self {
            session,
            prompt,
            boundary,
            fees: FeeStrategySelector::new(provider, resolver),
            credentials: Credentials::default(),
            treasury: None,
            pay_listener: Arc::new(RwLock::new(None)),
            pending_orders: Arc::new(DashMap::new()),
            pending_order_ttl: DEFAULT_PENDING_ORDER_TTL,
            rpc: JsonRpcClient::new(),
            fallback_rpc_url,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_treasury(mut self, treasury: Option<ChecksummedAddress>) -> Self {
        self.treasury = treasury;
        self
    }

    pub fn with_fee_provider(mut self, provider: Arc<dyn FeeParameterProvider>) -> Self {
        self.fees = FeeStrategySelector::new(provider, self.fees.resolver().clone());
        self
    }

    /// Accepted orders without a wallet response are forgotten after `ttl`.
    pub fn with_pending_order_ttl(mut self, ttl: Duration) -> Self {
        self.pending_order_ttl = ttl;
        self
    }

    /// Client used for receipt lookups.
    pub fn with_rpc_client(mut self, rpc: JsonRpcClient) -> Self {
        self.rpc = rpc;
        self
    }

    /// Endpoint for receipt lookups while no chain is selected.
    pub fn with_fallback_rpc_url(mut self, url: Option<Url>) -> Self {
        self.fallback_rpc_url = url;
        self
    }

    pub fn set_pay_listener(&self, listener: Arc<dyn PayListener>) {
        let mut guard = self
            .pay_listener
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(listener);
    }

    fn pay_listener(&self) -> Option<Arc<dyn PayListener>> {
        self.pay_listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Starts a payment attempt.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn pay(&self, request: PayRequest) -> Result<PendingPayment, FailureKind> {
        let checked = self.check_preconditions(&request);
        #[cfg(feature = "telemetry")]
        let checked = checked.inspect_err(|e| tracing::warn!(error = %e, ?request, "Payment precondition failed"));
        let (chain, prepared) = checked?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FailureKind::BoundaryException(e.to_string()))?;

        let (state_tx, state_rx) = watch::channel(PaymentState::Idle);
        let attempt = Attempt {
            orchestrator: self.clone(),
            request,
            chain,
            prepared,
            state: state_tx,
        };
        let handle = runtime.spawn(attempt.run());
        Ok(PendingPayment {
            handle,
            state: state_rx,
        })
    }

    fn check_preconditions(
        &self,
        request: &PayRequest,
    ) -> Result<(ChainDescriptor, PreparedTransfer), FailureKind> {
        if self.pay_listener().is_none() {
            return Err(FailureKind::NoListenerConfigured);
        }
        if !self.credentials.is_complete() {
            return Err(FailureKind::MissingCredentials);
        }
        let from = self
            .session
            .is_connected()
            .then(|| self.session.current_address())
            .flatten()
            .ok_or(FailureKind::NoWalletConnected)?;
        let chain = self
            .session
            .current_chain()
            .ok_or(FailureKind::NoChainSelected)?;
        if chain.rpc_url.is_none() {
            return Err(FailureKind::MissingRpcUrl(chain.id.to_string()));
        }
        let recipient = request
            .recipient
            .clone()
            .or_else(|| self.treasury.map(|treasury| treasury.to_string()))
            .unwrap_or_default();
        let prepared = match &request.token {
            Some(token) => TransferRequestBuilder::prepare_erc20(
                from,
                &recipient,
                &request.amount,
                token,
                &chain,
            ),
            None => TransferRequestBuilder::prepare_native(from, &recipient, &request.amount),
        }?;
        Ok((chain, prepared))
    }

    /// Relays the wallet's answer for `request_id` to the [`PayListener`].
    ///
    /// Each accepted order is reported at most once; returns the order that
    /// was reported, or `None` for an unknown or already reported request.
    pub fn on_wallet_response(&self, request_id: u64, response: WalletResponse) -> Option<Order> {
        self.evict_expired_orders();
        let Some((_, order)) = self.pending_orders.remove(&request_id) else {
            #[cfg(feature = "telemetry")]
            tracing::warn!(request_id, "Wallet response for unknown request");
            return None;
        };
        if let Some(listener) = self.pay_listener() {
            match response {
                WalletResponse::Sent { tx_hash } => {
                    #[cfg(feature = "telemetry")]
                    tracing::info!(order_id = %order.order_id, %tx_hash, "Transaction sent to blockchain");
                    listener.on_send_transaction_to_blockchain(&order.order_id, tx_hash)
                }
                WalletResponse::Failed { message } => {
                    #[cfg(feature = "telemetry")]
                    tracing::warn!(order_id = %order.order_id, %message, "Wallet reported payment failure");
                    listener.on_pay_failure(&order.order_id, &message)
                }
            }
        }
        Some(order)
    }

    /// Orders accepted by the wallet session whose final response is still outstanding.
    pub fn pending_orders(&self) -> Vec<Order> {
        self.evict_expired_orders();
        self.pending_orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Starts tracking an accepted order until its wallet response arrives.
    ///
    /// A request id that is still pending is a conflict: the earlier order can no
    /// longer be told apart, so it is reported to the [`PayListener`] as failed.
    fn track_order(&self, request_id: u64, order: Order) {
        self.evict_expired_orders();
        let Some(superseded) = self.pending_orders.insert(request_id, order) else {
            return;
        };
        #[cfg(feature = "telemetry")]
        tracing::warn!(request_id, order_id = %superseded.order_id, "Request id reused while its order is pending");
        if let Some(listener) = self.pay_listener() {
            listener.on_pay_failure(
                &superseded.order_id,
                "Superseded by a new request with the same id",
            );
        }
    }

    fn evict_expired_orders(&self) {
        let now = UnixTimestamp::now().as_secs();
        let ttl = self.pending_order_ttl.as_secs();
        self.pending_orders.retain(|_, order| {
            let live = now.saturating_sub(order.created_at.as_secs()) < ttl;
            if !live {
                #[cfg(feature = "telemetry")]
                tracing::warn!(order_id = %order.order_id, "Dropping order without wallet response");
            }
            live
        });
    }

    pub async fn disconnect_wallet(&self) -> Result<(), SessionError> {
        if !self.session.is_connected() {
            return Ok(());
        }
        self.session.disconnect().await
    }

    /// Looks the receipt up on the current chain, or on Ethereum when no chain is selected.
    pub async fn is_transaction_confirmed(&self, tx_hash: TxHash) -> Result<bool, ReceiptLookupError> {
        let rpc_url = self
            .session
            .current_chain()
            .and_then(|chain| chain.rpc_url)
            .or_else(|| self.fallback_rpc_url.clone())
            .ok_or(ReceiptLookupError::NoRpcUrl)?;
        Ok(self.rpc.transaction_confirmed(&rpc_url, tx_hash).await?)
    }
}

struct Attempt {
    orchestrator: PaymentOrchestrator,
    request: PayRequest,
    chain: ChainDescriptor,
    prepared: PreparedTransfer,
    state: watch::Sender<PaymentState>,
}

impl Attempt {
    fn transition(&self, next: PaymentState) {
        let previous = self.state.send_replace(next);
        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %self.chain.id, from = %previous, to = %next, "Payment state changed");
        #[cfg(not(feature = "telemetry"))]
        let _ = previous;
    }

    async fn run(self) -> PaymentOutcome {
        let outcome = self.execute().await;
        #[cfg(feature = "telemetry")]
        match &outcome {
            PaymentOutcome::Accepted(order) => {
                tracing::info!(order_id = %order.order_id, chain = %order.chain.id, amount = %order.amount, "Payment accepted")
            }
            PaymentOutcome::Rejected(kind) => {
                tracing::error!(chain = %self.chain.id, error = %kind, "Payment rejected")
            }
            PaymentOutcome::UserCancelled => {
                tracing::info!(chain = %self.chain.id, "Payment cancelled by user")
            }
        }
        self.transition(outcome.state());
        outcome
    }

    async fn execute(&self) -> PaymentOutcome {
        self.transition(PaymentState::AwaitingUserConfirmation);
        let prompt = PaymentPrompt {
            order_title: self.request.order_title.clone(),
            goods_description: self.request.goods_description.clone(),
            amount: self.prepared.amount,
            asset: self
                .prepared
                .token_symbol()
                .unwrap_or(&self.chain.name)
                .to_string(),
            chain: self.chain.clone(),
            recipient: self.prepared.to,
        };
        if self.orchestrator.prompt.confirm(&prompt).await == Decision::Decline {
            return PaymentOutcome::UserCancelled;
        }
        match self.submit().await {
            Ok(order) => PaymentOutcome::Accepted(order),
            Err(kind) => PaymentOutcome::Rejected(kind),
        }
    }

    async fn submit(&self) -> Result<Order, FailureKind> {
        let orchestrator = &self.orchestrator;
        let fees = orchestrator
            .fees
            .select(
                &self.chain,
                self.prepared.kind(),
                self.request.fee_override.as_ref(),
            )
            .await?;
        let request = self.prepared.clone().with_fees(fees);
        self.transition(PaymentState::Submitting);
        let submission = orchestrator
            .boundary
            .submit(&orchestrator.credentials, request)
            .await?;
        if let Some(kind) = submission.status.failure() {
            #[cfg(feature = "telemetry")]
            tracing::warn!(status = %submission.status, error = %kind, "Signing boundary refused payment");
            return Err(kind);
        }
        let sent = submission
            .result
            .await
            .map_err(|_| BoundaryError::Dropped)??;

        let order = Order::mint(sent.request_id, self.chain.clone(), self.prepared.amount);
        orchestrator.track_order(sent.request_id, order.clone());
        if let Some(listener) = &self.request.order_listener {
            listener.on_print_order(&order.order_id, &order.chain, &order.amount);
        }
        Ok(order)
    }
}
