//! Wallet session and user-facing collaborators.

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use evm_pay_eip155::chain::ChecksummedAddress;
use evm_pay_types::chain::ChainDescriptor;
use evm_pay_types::util::money_amount::MoneyAmount;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Wallet session failed: {0}")]
    Failed(String),
}

/// An established connection to the user's wallet.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn is_connected(&self) -> bool;
    fn current_address(&self) -> Option<Address>;
    fn current_chain(&self) -> Option<ChainDescriptor>;
    async fn disconnect(&self) -> Result<(), SessionError>;
}

/// What the user is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPrompt {
    pub order_title: String,
    pub goods_description: String,
    pub amount: MoneyAmount,
    /// Token symbol, or the chain name for a native transfer.
    pub asset: String,
    pub chain: ChainDescriptor,
    pub recipient: ChecksummedAddress,
}

impl fmt::Display for PaymentPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: pay {} {} to {} on {}",
            self.order_title, self.amount, self.asset, self.recipient, self.chain.name
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, prompt: &PaymentPrompt) -> Decision;
}

/// Notified once per accepted order.
pub trait OrderListener: Send + Sync {
    fn on_print_order(&self, order_id: &str, chain: &ChainDescriptor, amount: &MoneyAmount);
}

/// Receives the wallet's final word on an accepted order.
pub trait PayListener: Send + Sync {
    fn on_send_transaction_to_blockchain(&self, order_id: &str, tx_hash: TxHash);
    fn on_pay_failure(&self, order_id: &str, message: &str);
}

/// Response relayed from the wallet for an earlier session request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletResponse {
    Sent { tx_hash: TxHash },
    Failed { message: String },
}
