//! Escrow domain errors

use chrono::{DateTime, Utc};
use core_kernel::{Money, MoneyError};
use thiserror::Error;

/// Errors that can occur in the escrow domain
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Operation not legal from the current status
    #[error("Invalid transition: cannot {action} while {from}")]
    InvalidTransition { from: String, action: String },

    /// A movement exceeded the remaining escrow balance
    ///
    /// Unreachable when claims are capped at submission time; checked
    /// defensively on every debit.
    #[error("Insufficient escrow balance: requested {requested}, remaining {remaining}")]
    InsufficientEscrowBalance { requested: Money, remaining: Money },

    /// The three-way split no longer sums to the fixed total
    #[error("Fund breakdown mismatch: expected {expected}, got {actual}")]
    BreakdownMismatch { expected: Money, actual: Money },

    /// Zero or negative amount passed to a ledger operation
    #[error("Amount must be positive, got {amount}")]
    AmountNotPositive { amount: Money },

    /// Full release requested before the tenancy has ended
    #[error("Tenancy has not ended: inspection window opens at {opens_at}")]
    TenancyNotEnded { opens_at: DateTime<Utc> },

    /// Full release requested while claims still hold part of the funds
    #[error("Open claims still hold {held} in escrow")]
    OpenClaimsRemain { held: Money },

    /// Arithmetic error (currency mismatch, overflow)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl EscrowError {
    /// Creates an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        EscrowError::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }
}
