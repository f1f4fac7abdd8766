//! The opaque signing boundary.
//!
//! The orchestrator never signs nor broadcasts anything itself. A finished
//! [`TransferRequest`] is handed to a [`SigningBoundary`] together with the
//! merchant [`Credentials`]. The boundary answers in two steps: a synchronous
//! [`StatusCode`] (limits, key validity, token support) and, when that is OK,
//! an asynchronous [`SentRequest`] carrying the wallet session request id.

use async_trait::async_trait;
use evm_pay_eip155::fee::FeeParameterProvider;
use evm_pay_eip155::transfer::TransferRequest;
use evm_pay_types::failure::FailureKind;
use std::fmt;
use tokio::sync::oneshot;

use crate::status::StatusCode;

/// Merchant access key pair forwarded to the signing boundary.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new<A: Into<String>, S: Into<String>>(access_key: A, secret_key: S) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.access_key.trim().is_empty() && !self.secret_key.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// The wallet session accepted the request and assigned it an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentRequest {
    pub request_id: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("Signing boundary failed: {0}")]
    Failed(String),
    #[error("Signing boundary dropped the request without answering")]
    Dropped,
}

impl From<BoundaryError> for FailureKind {
    fn from(value: BoundaryError) -> Self {
        FailureKind::BoundaryException(value.to_string())
    }
}

/// Answer of [`SigningBoundary::submit`].
#[derive(Debug)]
pub struct Submission {
    pub status: StatusCode,
    pub result: oneshot::Receiver<Result<SentRequest, BoundaryError>>,
}

impl Submission {
    /// An OK submission plus the sender the boundary resolves later.
    pub fn accepted() -> (Self, oneshot::Sender<Result<SentRequest, BoundaryError>>) {
        let (tx, rx) = oneshot::channel();
        let submission = Submission {
            status: StatusCode::OK,
            result: rx,
        };
        (submission, tx)
    }

    /// A submission refused up front with `status`. Nothing will arrive on `result`.
    pub fn refused(status: StatusCode) -> Self {
        let (_, rx) = oneshot::channel();
        Submission { status, result: rx }
    }
}

/// Signs and forwards transfer requests on behalf of the connected wallet.
///
/// A boundary is also the source of recommended fee parameters.
#[async_trait]
pub trait SigningBoundary: FeeParameterProvider {
    async fn submit(
        &self,
        credentials: &Credentials,
        request: TransferRequest,
    ) -> Result<Submission, BoundaryError>;
}
