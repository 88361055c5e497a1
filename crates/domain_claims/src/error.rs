//! Claims domain errors

use chrono::{DateTime, Utc};
use core_kernel::{Money, MoneyError};
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Operation not legal from the current status
    #[error("Invalid transition: cannot {action} while {from}")]
    InvalidTransition { from: String, action: String },

    /// Claim raised before the tenancy has ended
    #[error("Inspection window not open until {opens_at}")]
    InspectionWindowNotOpen { opens_at: DateTime<Utc> },

    /// Claim raised after the 7-day window closed
    #[error("Inspection window closed at {closed_at}")]
    InspectionWindowClosed { closed_at: DateTime<Utc> },

    /// Submission would push the open-claim total past the escrow remainder
    #[error("Insufficient escrow balance: requested {requested}, available {available}")]
    InsufficientEscrowBalance { requested: Money, available: Money },

    /// Counter-amount outside the open interval (0, claimed)
    #[error("Invalid counter amount {counter}: must be strictly between zero and {claimed}")]
    InvalidCounterAmount { counter: Money, claimed: Money },

    /// Accepting a counter on a flat rejection; only escalation is offered
    #[error("No counter-amount to accept: the tenant rejected the claim outright")]
    CounterNotAvailable,

    /// Settlement above the claimed amount
    #[error("Settlement {settled} exceeds claimed amount {claimed}")]
    SettlementExceedsClaim { settled: Money, claimed: Money },

    /// Zero or negative claimed amount
    #[error("Amount must be positive, got {amount}")]
    AmountNotPositive { amount: Money },

    /// Arithmetic error (currency mismatch, overflow)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl ClaimError {
    /// Creates an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        ClaimError::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }
}
