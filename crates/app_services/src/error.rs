//! Application-level error type

use thiserror::Error;

use core_kernel::GatewayError;
use domain_agreement::AgreementError;
use domain_claims::ClaimError;
use domain_escrow::EscrowError;

use crate::store::StoreError;

/// Error returned by the application services
///
/// Wraps the domain taxonomies unchanged; callers match on the inner kind
/// to decide between retry and a terminal surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Agreement(#[from] AgreementError),

    #[error(transparent)]
    Escrow(#[from] EscrowError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    /// Returns true if the caller may retry after re-fetching state
    ///
    /// Optimistic-lock conflicts and gateway failures are retryable; the
    /// rest represent a misuse of the state machine.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Store(err) => err.is_retryable(),
            ServiceError::Gateway(_) => true,
            ServiceError::Agreement(err) => err.is_retryable(),
            _ => false,
        }
    }
}
