//! Agreement domain errors

use chrono::{DateTime, Utc};
use core_kernel::PartyRole;
use thiserror::Error;

/// Errors that can occur in the agreement domain
///
/// Every variant carries enough context for the caller to decide whether
/// to re-fetch state and retry, or to surface a terminal message.
#[derive(Debug, Error)]
pub enum AgreementError {
    /// Operation not legal from the current status
    #[error("Invalid transition: cannot {action} while {from}")]
    InvalidTransition { from: String, action: String },

    /// Withdrawal attempted after the other party already committed
    #[error("Withdrawal not allowed: the {other_party} has already signed")]
    WithdrawalNotAllowed { other_party: PartyRole },

    /// Action attempted past the stage deadline
    #[error("Agreement expired at {expired_at}")]
    AgreementExpired { expired_at: DateTime<Utc> },

    /// The payment step failed or timed out; caller-retryable
    #[error("Gateway failure: {reason}")]
    GatewayFailure { reason: String },

    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AgreementError {
    /// Creates an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        AgreementError::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }

    /// Returns true if the caller may retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgreementError::GatewayFailure { .. })
    }
}
