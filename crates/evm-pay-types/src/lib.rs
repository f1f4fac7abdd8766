//! Core types for EVM payment orchestration.
//!
//! This crate holds everything that does not need a network connection: chain
//! identifiers and descriptors, exact conversion of human amounts into integer
//! minor units, and the failure taxonomy every payment attempt resolves into.
//!
//! # Modules
//!
//! - [`amount`] - Decimal amount to minor-unit conversion and hex quantity encoding
//! - [`chain`] - CAIP-2 chain identifiers, chain descriptors and the chain registry
//! - [`config`] - Environment variable resolution for configuration values
//! - [`failure`] - The [`failure::FailureKind`] taxonomy
//! - [`networks`] - Well-known EVM networks and their default RPC endpoints
//! - [`timestamp`] - Unix timestamps for order creation times
//! - [`util`] - Human-readable money amount parsing

pub mod amount;
pub mod chain;
pub mod config;
pub mod failure;
pub mod networks;
pub mod timestamp;
pub mod util;
