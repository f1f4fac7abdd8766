//! Status codes returned by the signing boundary.
//!
//! | Code | Meaning |
//! |---|---|
//! | `0` | OK |
//! | `-1` | Access key invalid |
//! | `-2` | Payment invocation failed |
//! | `-3` | Single transaction limit exceeded |
//! | `-4` | Monthly limit exceeded |
//! | `-5` | Unsupported chain |
//! | `-6` | Failed to fetch token price |
//! | `-7` | Access key expired |
//! | `-8` | Unsupported ERC20 token |
//! | `-9` | Token symbol mismatch |
//!
//! Any other code is an [`FailureKind::UnknownFailure`].

use evm_pay_types::failure::{FailureKind, LimitScope};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);
    pub const ACCESS_KEY_INVALID: StatusCode = StatusCode(-1);
    pub const PAYMENT_ERROR: StatusCode = StatusCode(-2);
    pub const SINGLE_TRANSACTION_LIMIT: StatusCode = StatusCode(-3);
    pub const MONTHLY_LIMIT: StatusCode = StatusCode(-4);
    pub const UNSUPPORTED_CHAIN: StatusCode = StatusCode(-5);
    pub const TOKEN_PRICE_UNAVAILABLE: StatusCode = StatusCode(-6);
    pub const ACCESS_KEY_EXPIRED: StatusCode = StatusCode(-7);
    pub const UNSUPPORTED_TOKEN: StatusCode = StatusCode(-8);
    pub const TOKEN_SYMBOL_MISMATCH: StatusCode = StatusCode(-9);

    pub fn is_ok(&self) -> bool {
        *self == StatusCode::OK
    }

    /// `None` for [`StatusCode::OK`], the matching failure otherwise.
    pub fn failure(&self) -> Option<FailureKind> {
        let kind = match *self {
            StatusCode::OK => return None,
            StatusCode::ACCESS_KEY_INVALID => FailureKind::AccessKeyInvalid,
            StatusCode::PAYMENT_ERROR => FailureKind::PaymentError,
            StatusCode::SINGLE_TRANSACTION_LIMIT => {
                FailureKind::TransactionLimitExceeded(LimitScope::SingleTransaction)
            }
            StatusCode::MONTHLY_LIMIT => FailureKind::TransactionLimitExceeded(LimitScope::Monthly),
            StatusCode::UNSUPPORTED_CHAIN => FailureKind::UnsupportedChain,
            StatusCode::TOKEN_PRICE_UNAVAILABLE => FailureKind::TokenPriceUnavailable,
            StatusCode::ACCESS_KEY_EXPIRED => FailureKind::AccessKeyExpired,
            StatusCode::UNSUPPORTED_TOKEN => FailureKind::UnsupportedToken,
            StatusCode::TOKEN_SYMBOL_MISMATCH => FailureKind::TokenSymbolMismatch,
            StatusCode(code) => FailureKind::UnknownFailure(code),
        };
        Some(kind)
    }
}

impl From<i32> for StatusCode {
    fn from(value: i32) -> Self {
        StatusCode(value)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
