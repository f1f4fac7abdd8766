//! EIP-155 (EVM) transfer shaping.
//!
//! Everything chain-specific that happens between "pay this amount" and handing
//! a transaction to a wallet:
//!
//! - [`capability`] - EIP-1559 or legacy: allow-list plus live RPC probe
//! - [`fee`] - Fee parameter providers and the selector that applies the fee model
//! - [`transfer`] - Validated native and ERC20 [`transfer::TransferRequest`]s
//! - [`wallet_request`] - `eth_sendTransaction` parameters for a request
//! - [`rpc`] - alloy-provider lookups for probes, fee suggestions, receipts and transactions
//! - [`chain`] - Addresses, chain references and ERC20 tokens
//! - [`networks`] - Well-known networks and stablecoin presets
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits `tracing` events for probes, fee selection and RPC failures

pub mod capability;
pub mod chain;
pub mod fee;
pub mod networks;
pub mod rpc;
pub mod transfer;
pub mod wallet_request;

pub use capability::{ChainCapabilityResolver, Eip1559Probe, FeeModel};
pub use fee::{FeeParameterProvider, FeeParameters, FeeStrategySelector, RawFeeParameters, TransferKind};
pub use transfer::{PreparedTransfer, TransferRequest, TransferRequestBuilder};
