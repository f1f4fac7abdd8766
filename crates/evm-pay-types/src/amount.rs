//! Exact conversion of decimal amounts into integer minor units.
//!
//! Every on-chain quantity is an integer: wei for native coins (18 decimals),
//! or the token's smallest unit for ERC20 transfers. The conversion here never
//! goes through floating point, so `10.5` at 6 decimals is exactly `10500000`.
//!
//! Quantities travel to wallets as JSON-RPC hex strings: `0x`-prefixed, lowercase,
//! no leading zeros, and `"0x0"` for zero.
//!
//! ```rust
//! use evm_pay_types::amount::{to_hex, to_minor_units};
//! use evm_pay_types::util::money_amount::MoneyAmount;
//!
//! let half = MoneyAmount::parse("0.5").unwrap();
//! let wei = to_minor_units(&half, 18).unwrap();
//! assert_eq!(to_hex(wei), "0x6f05b59d3b20000");
//! ```

use alloy_primitives::U256;

use crate::util::money_amount::{MoneyAmount, MoneyAmountParseError};

/// Errors produced while scaling or encoding an amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error(transparent)]
    Parse(#[from] MoneyAmountParseError),
    /// The amount has more fractional digits than the asset supports.
    #[error("Too big of a precision: {money} vs {decimals} decimals on asset")]
    WrongPrecision { money: u32, decimals: u8 },
    #[error("Amount does not fit into 256 bits at {decimals} decimals")]
    Overflow { decimals: u8 },
    #[error("Invalid hex quantity {0:?}")]
    InvalidHex(String),
}

/// Converts `amount` into integer minor units at `decimals` precision.
///
/// # Errors
///
/// Fails with [`AmountError::WrongPrecision`] if `amount` cannot be represented
/// at `decimals` without rounding, and [`AmountError::Overflow`] if the result
/// exceeds `U256`.
pub fn to_minor_units(amount: &MoneyAmount, decimals: u8) -> Result<U256, AmountError> {
    let scale = amount.scale();
    if scale > u32::from(decimals) {
        return Err(AmountError::WrongPrecision {
            money: scale,
            decimals,
        });
    }
    let shift = u32::from(decimals) - scale;
    let multiplier = U256::from(10u8)
        .checked_pow(U256::from(shift))
        .ok_or(AmountError::Overflow { decimals })?;
    U256::from(amount.mantissa())
        .checked_mul(multiplier)
        .ok_or(AmountError::Overflow { decimals })
}

/// Parses a human amount string and converts it in one go.
///
/// Fractional digits beyond what a decimal can hold are reported as
/// [`AmountError::WrongPrecision`], the same as any other excess precision.
pub fn parse_minor_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = match MoneyAmount::parse(input) {
        Err(MoneyAmountParseError::PrecisionExceeded { digits }) => {
            return Err(AmountError::WrongPrecision {
                money: digits,
                decimals,
            });
        }
        parsed => parsed?,
    };
    to_minor_units(&amount, decimals)
}

/// Encodes a quantity as a JSON-RPC hex string.
pub fn to_hex(value: U256) -> String {
    if value.is_zero() {
        return "0x0".to_string();
    }
    format!("0x{value:x}")
}

/// Decodes a JSON-RPC hex quantity. The `0x` prefix is required.
pub fn from_hex(value: &str) -> Result<U256, AmountError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .filter(|digits| !digits.is_empty())
        .ok_or_else(|| AmountError::InvalidHex(value.to_string()))?;
    U256::from_str_radix(digits, 16).map_err(|_| AmountError::InvalidHex(value.to_string()))
}

/// Serde adapter for `U256` fields carried as hex quantities.
pub mod hex_quantity {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> MoneyAmount {
        MoneyAmount::parse(s).unwrap()
    }

    #[test]
    fn test_native_half_ether() {
        let wei = to_minor_units(&amount("0.5"), 18).unwrap();
        assert_eq!(wei, U256::from(500_000_000_000_000_000u64));
        assert_eq!(to_hex(wei), "0x6f05b59d3b20000");
    }

    #[test]
    fn test_six_decimal_token() {
        let units = to_minor_units(&amount("10.5"), 6).unwrap();
        assert_eq!(units, U256::from(10_500_000u64));
        assert_eq!(to_hex(units), "0xa037a0");
    }

    #[test]
    fn test_zero_encodes_as_0x0() {
        let wei = to_minor_units(&MoneyAmount::ZERO, 18).unwrap();
        assert_eq!(wei, U256::ZERO);
        assert_eq!(to_hex(wei), "0x0");
        assert_eq!(from_hex("0x0").unwrap(), U256::ZERO);
    }

    #[test]
    fn test_hex_roundtrip_for_common_decimals() {
        for decimals in [6u8, 18] {
            for value in ["0", "0.000001", "1", "123.456789"] {
                let units = to_minor_units(&amount(value), decimals).unwrap();
                assert_eq!(
                    from_hex(&to_hex(units)).unwrap(),
                    units,
                    "{value} at {decimals}"
                );
            }
        }
    }

    #[test]
    fn test_precision_exceeding_decimals() {
        let err = to_minor_units(&amount("1.0000001"), 6).unwrap_err();
        assert_eq!(
            err,
            AmountError::WrongPrecision {
                money: 7,
                decimals: 6
            }
        );
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let units = to_minor_units(&amount("1.500000000"), 2).unwrap();
        assert_eq!(units, U256::from(150u64));
    }

    #[test]
    fn test_overflow() {
        let huge = amount("79228162514264337593543950335");
        let err = to_minor_units(&huge, 255).unwrap_err();
        assert_eq!(err, AmountError::Overflow { decimals: 255 });
    }

    #[test]
    fn test_parse_minor_units_negative() {
        assert_eq!(
            parse_minor_units("-3", 18),
            Err(AmountError::Parse(MoneyAmountParseError::Negative))
        );
    }

    #[test]
    fn test_parse_minor_units_never_rewrites_input() {
        assert_eq!(
            parse_minor_units("1e5", 0),
            Err(AmountError::Parse(MoneyAmountParseError::InvalidFormat))
        );
        assert_eq!(
            parse_minor_units("1,5", 6),
            Err(AmountError::Parse(MoneyAmountParseError::InvalidFormat))
        );
        assert_eq!(
            parse_minor_units("1,500", 6).unwrap(),
            U256::from(1_500_000_000u64)
        );
    }

    #[test]
    fn test_parse_minor_units_rejects_sub_decimal_dust() {
        assert_eq!(
            parse_minor_units("1.00000000000000000000000000001", 18),
            Err(AmountError::WrongPrecision {
                money: 29,
                decimals: 18
            })
        );
        assert_eq!(
            parse_minor_units("0.000000000000000000000000000009", 18),
            Err(AmountError::WrongPrecision {
                money: 30,
                decimals: 18
            })
        );
    }

    #[test]
    fn test_from_hex_rejects_unprefixed() {
        assert!(from_hex("75bcd15").is_err());
        assert!(from_hex("0x").is_err());
        assert!(from_hex("0xzz").is_err());
        assert_eq!(from_hex("0x75bcd15").unwrap(), U256::from(123456789u64));
    }
}
