//! Payment orchestration on top of [`evm_pay_eip155`].
//!
//! A [`PaymentOrchestrator`] takes a [`PayRequest`], checks it against the
//! connected [`WalletSession`](session::WalletSession), asks the user to confirm,
//! picks fees, builds the transfer and hands it to the
//! [`SigningBoundary`](boundary::SigningBoundary). The outcome is a
//! [`PaymentOutcome`]: an accepted [`Order`], a rejection with a
//! [`FailureKind`](evm_pay_types::failure::FailureKind), or a user cancellation.
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits `tracing` events for state transitions and failures

pub mod boundary;
pub mod config;
pub mod orchestrator;
pub mod session;
pub mod status;

pub use boundary::{Credentials, SigningBoundary, Submission};
pub use config::PaymentConfig;
pub use orchestrator::{Order, PayRequest, PaymentOrchestrator, PaymentOutcome, PendingPayment};
pub use status::StatusCode;
