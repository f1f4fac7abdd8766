//! Helper types.

pub mod money_amount;
