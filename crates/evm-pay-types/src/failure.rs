//! Why a payment attempt did not go through.
//!
//! [`FailureKind`] is the single vocabulary for every non-success outcome:
//! local precondition failures detected before any network activity, failures
//! of the fee and capability lookups, and the status codes returned by the
//! signing boundary.

use serde::Serialize;
use std::fmt;

/// Which spending limit the signing boundary reported as exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitScope {
    SingleTransaction,
    Monthly,
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitScope::SingleTransaction => write!(f, "single transaction"),
            LimitScope::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FailureKind {
    /// `pay` was called before a pay listener was registered.
    #[error("No pay listener is set")]
    NoListenerConfigured,
    #[error("Access key or secret key is empty")]
    MissingCredentials,
    #[error("Please connect a wallet first")]
    NoWalletConnected,
    #[error("Connected wallet has no chain selected")]
    NoChainSelected,
    #[error("RPC URL is missing for chain {0}")]
    MissingRpcUrl(String),
    #[error("Token is deployed on {token_chain} but the wallet is on {wallet_chain}")]
    ChainTokenMismatch {
        token_chain: String,
        wallet_chain: String,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("EIP-1559 capability probe failed: {0}")]
    CapabilityProbeFailed(String),
    #[error("Fee parameters unavailable: {0}")]
    FeeParametersUnavailable(String),

    // Signing boundary status codes
    #[error("Access key is invalid")]
    AccessKeyInvalid,
    #[error("Payment invocation failed")]
    PaymentError,
    #[error("The {0} limit is exceeded")]
    TransactionLimitExceeded(LimitScope),
    #[error("Unsupported chain")]
    UnsupportedChain,
    #[error("Failed to fetch token price")]
    TokenPriceUnavailable,
    #[error("Access key is expired")]
    AccessKeyExpired,
    #[error("Unsupported ERC20 token")]
    UnsupportedToken,
    #[error("Token symbol mismatch")]
    TokenSymbolMismatch,
    #[error("Unknown failure, status code {0}")]
    UnknownFailure(i32),

    /// The boundary raised an error instead of returning a status code.
    #[error("Signing boundary error: {0}")]
    BoundaryException(String),
}

impl FailureKind {
    /// True for failures detected locally before anything was sent anywhere.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FailureKind::NoListenerConfigured
                | FailureKind::MissingCredentials
                | FailureKind::NoWalletConnected
                | FailureKind::NoChainSelected
                | FailureKind::MissingRpcUrl(_)
                | FailureKind::ChainTokenMismatch { .. }
                | FailureKind::InvalidAmount(_)
                | FailureKind::InvalidRecipient(_)
        )
    }
}
