//! Terminal stand-ins for the wallet session, confirmation dialog and listeners.

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use evm_pay_orchestrator::session::{
    ConfirmationPrompt, Decision, OrderListener, PayListener, PaymentPrompt, SessionError,
    WalletSession,
};
use evm_pay_types::chain::ChainDescriptor;
use evm_pay_types::util::money_amount::MoneyAmount;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// A session pinned to one address and chain from the command line.
pub struct StaticSession {
    address: Address,
    chain: ChainDescriptor,
    connected: AtomicBool,
}

impl StaticSession {
    pub fn new(address: Address, chain: ChainDescriptor) -> Self {
        Self {
            address,
            chain,
            connected: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl WalletSession for StaticSession {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn current_address(&self) -> Option<Address> {
        self.is_connected().then_some(self.address)
    }

    fn current_chain(&self) -> Option<ChainDescriptor> {
        self.is_connected().then(|| self.chain.clone())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ConsolePrompt {
    auto_approve: bool,
}

impl ConsolePrompt {
    pub fn new(auto_approve: bool) -> Self {
        Self { auto_approve }
    }
}

fn read_answer(question: String) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{question} [y/N] ")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl ConfirmationPrompt for ConsolePrompt {
    async fn confirm(&self, prompt: &PaymentPrompt) -> Decision {
        if !prompt.goods_description.is_empty() {
            println!("{}", prompt.goods_description);
        }
        if self.auto_approve {
            println!("{prompt}");
            return Decision::Approve;
        }
        let question = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || read_answer(question)).await;
        match answer {
            Ok(Ok(answer)) if is_yes(&answer) => Decision::Approve,
            Ok(Ok(_)) => Decision::Decline,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not read confirmation, declining");
                Decision::Decline
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation task failed, declining");
                Decision::Decline
            }
        }
    }
}

/// Reports order and wallet events on the log.
pub struct ConsoleListener;

impl OrderListener for ConsoleListener {
    fn on_print_order(&self, order_id: &str, chain: &ChainDescriptor, amount: &MoneyAmount) {
        tracing::info!(order_id, chain = %chain.id, %amount, "Order created");
    }
}

impl PayListener for ConsoleListener {
    fn on_send_transaction_to_blockchain(&self, order_id: &str, tx_hash: TxHash) {
        tracing::info!(order_id, %tx_hash, "Transaction sent");
    }

    fn on_pay_failure(&self, order_id: &str, message: &str) {
        tracing::error!(order_id, message, "Payment failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evm_pay_types::chain::ChainId;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[tokio::test]
    async fn test_static_session_disconnect() {
        let session = StaticSession::new(
            Address::ZERO,
            ChainDescriptor::new(ChainId::new("eip155", "1"), "Ethereum", None),
        );
        assert!(session.current_chain().is_some());
        session.disconnect().await.unwrap();
        assert!(!session.is_connected());
        assert!(session.current_address().is_none());
        assert!(session.current_chain().is_none());
    }
}
