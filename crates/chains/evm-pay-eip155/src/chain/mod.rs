//! EVM chain types.
//!
//! - [`ChecksummedAddress`] and [`Eip155ChainReference`] - EVM value types
//! - [`Erc20Token`] and [`TokenRegistry`] - Token deployments a payment may use
//! - [`erc20`] - The `transfer(address,uint256)` call encoding

pub mod erc20;

mod token;
pub use token::*;

mod types;
pub use types::*;
