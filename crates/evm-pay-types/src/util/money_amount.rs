//! Human-readable payment amounts.
//!
//! [`MoneyAmount`] is the decimal quantity a payer asks to transfer, before it is
//! scaled to the asset's minor units by [`crate::amount::to_minor_units`].
//!
//! Accepted inputs:
//!
//! - Plain numbers: `"0.5"`, `"10.5"`
//! - With a leading currency symbol: `"$10.50"`, `"€ 3"`
//! - With well-formed thousand separators: `"1,000.25"`
//!
//! Anything else (exponents, stray letters, `"1,5"`) is rejected rather than
//! reinterpreted, and the decimal is parsed exactly, never rounded.
//!
//! ```rust
//! use evm_pay_types::util::money_amount::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("$10.50").unwrap();
//! assert_eq!(amount.scale(), 1);
//! assert_eq!(amount.mantissa(), 105);
//! ```

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static AMOUNT_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<sign>-)?\s*(?:[$€£¥]\s*)?(?P<int>\d{1,3}(?:,\d{3})+|\d+)(?:\.(?P<frac>\d+))?\s*$",
    )
    .expect("valid regex")
});

/// Fractional digits a [`Decimal`] can hold.
pub const MAX_FRACTION_DIGITS: u32 = 28;

/// A non-negative decimal amount.
///
/// The value is kept normalized: `"10.50"` and `"10.5"` are the same amount with
/// scale 1. Zero is a valid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoneyAmount(Decimal);

impl MoneyAmount {
    /// The zero amount.
    pub const ZERO: MoneyAmount = MoneyAmount(Decimal::ZERO);

    /// Wraps a decimal, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self, MoneyAmountParseError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyAmountParseError::Negative);
        }
        Ok(MoneyAmount(value.normalize()))
    }

    /// Number of significant fractional digits.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// The value with the decimal point removed, e.g. `12.34` gives `1234`.
    pub fn mantissa(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parses a human-readable amount.
    ///
    /// # Errors
    ///
    /// - [`MoneyAmountParseError::InvalidFormat`] for anything but an optionally
    ///   signed, optionally symbol-prefixed decimal number
    /// - [`MoneyAmountParseError::PrecisionExceeded`] for more than
    ///   [`MAX_FRACTION_DIGITS`] significant fractional digits
    /// - [`MoneyAmountParseError::OutOfRange`] when the value has no exact decimal form
    /// - [`MoneyAmountParseError::Negative`] for values below zero
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        let caps = AMOUNT_FORMAT
            .captures(input)
            .ok_or(MoneyAmountParseError::InvalidFormat)?;
        let integer = caps["int"].replace(',', "");
        let fraction = caps
            .name("frac")
            .map_or("", |m| m.as_str().trim_end_matches('0'));
        let digits = u32::try_from(fraction.len()).unwrap_or(u32::MAX);
        if digits > MAX_FRACTION_DIGITS {
            return Err(MoneyAmountParseError::PrecisionExceeded { digits });
        }
        let literal = if fraction.is_empty() {
            integer
        } else {
            format!("{integer}.{fraction}")
        };
        let parsed =
            Decimal::from_str_exact(&literal).map_err(|_| MoneyAmountParseError::OutOfRange)?;
        if caps.name("sign").is_some() && !parsed.is_zero() {
            return Err(MoneyAmountParseError::Negative);
        }
        MoneyAmount::new(parsed)
    }
}

/// Errors that can occur when reading a payment amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyAmountParseError {
    #[error("Invalid number format")]
    InvalidFormat,
    #[error("Negative value is not allowed")]
    Negative,
    #[error("Amount has {digits} fractional digits, at most 28 are supported")]
    PrecisionExceeded { digits: u32 },
    #[error("Amount cannot be represented exactly")]
    OutOfRange,
    /// NaN, infinity, or a float outside the decimal range.
    #[error("Amount is not a finite number")]
    NonFinite,
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoneyAmount::parse(s)
    }
}

impl TryFrom<&str> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MoneyAmount::from_str(value)
    }
}

impl From<u64> for MoneyAmount {
    fn from(value: u64) -> Self {
        MoneyAmount(Decimal::from(value))
    }
}

impl TryFrom<f64> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(MoneyAmountParseError::NonFinite);
        }
        let decimal = Decimal::from_f64(value).ok_or(MoneyAmountParseError::NonFinite)?;
        MoneyAmount::new(decimal)
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MoneyAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MoneyAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MoneyAmount::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_symbols_and_separators() {
        let amount = MoneyAmount::parse("$1,000.25").unwrap();
        assert_eq!(amount.to_string(), "1000.25");
        assert_eq!(amount.scale(), 2);
        assert_eq!(amount.mantissa(), 100025);
    }

    #[test]
    fn test_parse_normalizes_trailing_zeros() {
        let amount = MoneyAmount::parse("10.500000").unwrap();
        assert_eq!(amount.scale(), 1);
        assert_eq!(amount, MoneyAmount::parse("10.5").unwrap());
    }

    #[test]
    fn test_parse_zero() {
        let amount = MoneyAmount::parse("0").unwrap();
        assert!(amount.is_zero());
        assert_eq!(amount, MoneyAmount::ZERO);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(
            MoneyAmount::parse("-1.5"),
            Err(MoneyAmountParseError::Negative)
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(
            MoneyAmount::parse("ten dollars"),
            Err(MoneyAmountParseError::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_exponent_and_stray_letters() {
        for input in ["1e5", "1E5", "10 USDT", "0x10", "1.5.2", "$", ""] {
            assert_eq!(
                MoneyAmount::parse(input),
                Err(MoneyAmountParseError::InvalidFormat),
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_malformed_separators() {
        for input in ["1,5", "1,50", "12,3456", ",100", "1,000,00"] {
            assert_eq!(
                MoneyAmount::parse(input),
                Err(MoneyAmountParseError::InvalidFormat),
                "{input}"
            );
        }
        assert_eq!(
            MoneyAmount::parse("12,345,678.9").unwrap().to_string(),
            "12345678.9"
        );
        assert_eq!(MoneyAmount::parse(" € 3 ").unwrap(), MoneyAmount::from(3));
    }

    #[test]
    fn test_parse_rejects_digits_beyond_decimal_precision() {
        assert_eq!(
            MoneyAmount::parse("1.00000000000000000000000000001"),
            Err(MoneyAmountParseError::PrecisionExceeded { digits: 29 })
        );
        assert_eq!(
            MoneyAmount::parse("0.000000000000000000000000000009"),
            Err(MoneyAmountParseError::PrecisionExceeded { digits: 30 })
        );
        let padded = MoneyAmount::parse("1.500000000000000000000000000000000").unwrap();
        assert_eq!(padded, MoneyAmount::parse("1.5").unwrap());
    }

    #[test]
    fn test_parse_keeps_every_digit() {
        let amount = MoneyAmount::parse("0.000000000000000000000000001").unwrap();
        assert_eq!(amount.scale(), 27);
        assert_eq!(amount.mantissa(), 1);
        assert_eq!(
            MoneyAmount::parse("79228162514264337593543950336"),
            Err(MoneyAmountParseError::OutOfRange)
        );
    }

    #[test]
    fn test_try_from_f64_non_finite() {
        assert_eq!(
            MoneyAmount::try_from(f64::NAN),
            Err(MoneyAmountParseError::NonFinite)
        );
        assert_eq!(
            MoneyAmount::try_from(f64::INFINITY),
            Err(MoneyAmountParseError::NonFinite)
        );
        assert_eq!(
            MoneyAmount::try_from(0.5).unwrap(),
            MoneyAmount::parse("0.5").unwrap()
        );
    }

    #[test]
    fn test_serde_as_string() {
        let amount = MoneyAmount::parse("123.456789").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"123.456789\"");
        let back: MoneyAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
