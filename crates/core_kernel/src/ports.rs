//! Ports the core consumes from its collaborators
//!
//! The core talks to the outside world through two narrow contracts: the
//! payment gateway (the only operation that may block on an external
//! system) and the notification dispatcher (fire-and-forget). Adapters for
//! the real processor and the real delivery channel live outside this
//! workspace; the core depends only on these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::{AgreementId, ClaimId, DepositId, PartyId};
use crate::money::Money;
use crate::party::PartyRole;

/// Outcome of a gateway charge, as reported by the processor
///
/// Lifecycle transitions that depend on a successful charge commit only
/// after observing `Success`; a `Failure` leaves the aggregate untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success {
        /// Processor-assigned reference for reconciliation
        reference: String,
    },
    Failure {
        reason: String,
    },
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Success { .. })
    }

    /// Returns the processor reference for a successful outcome
    pub fn reference(&self) -> Option<&str> {
        match self {
            PaymentOutcome::Success { reference } => Some(reference),
            PaymentOutcome::Failure { .. } => None,
        }
    }
}

/// Errors surfaced by the payment gateway adapter
///
/// All variants are caller-retryable: a failed or timed-out charge never
/// leaves a half-applied lifecycle transition behind.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Charge declined: {reason}")]
    Declined { reason: String },

    #[error("Gateway timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Gateway unavailable: {message}")]
    Unavailable { message: String },
}

impl GatewayError {
    /// Returns true if this failure is worth retrying without user action
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout { .. } | GatewayError::Unavailable { .. }
        )
    }
}

/// The single capability the core needs from the payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges (or authorizes) `amount` against the given payer
    ///
    /// The concrete processor protocol is the adapter's concern; the core
    /// only observes the outcome.
    async fn charge_or_authorize(
        &self,
        amount: Money,
        payer: PartyId,
    ) -> Result<PaymentOutcome, GatewayError>;
}

/// Events the core emits for downstream delivery (email, push, in-app)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    AgreementSigned {
        agreement_id: AgreementId,
        by: PartyRole,
    },
    AgreementFullySigned {
        agreement_id: AgreementId,
    },
    AgreementWithdrawn {
        agreement_id: AgreementId,
        by: PartyRole,
    },
    WebsiteFeePaid {
        agreement_id: AgreementId,
    },
    AgreementActivated {
        agreement_id: AgreementId,
        deposit_id: DepositId,
    },
    AgreementExpired {
        agreement_id: AgreementId,
    },
    ClaimSubmitted {
        deposit_id: DepositId,
        claim_id: ClaimId,
    },
    ClaimTenantNotified {
        claim_id: ClaimId,
    },
    ClaimResolved {
        claim_id: ClaimId,
    },
    ClaimEscalated {
        claim_id: ClaimId,
    },
    DepositReleased {
        deposit_id: DepositId,
    },
}

impl NotificationEvent {
    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            NotificationEvent::AgreementSigned { .. } => "AgreementSigned",
            NotificationEvent::AgreementFullySigned { .. } => "AgreementFullySigned",
            NotificationEvent::AgreementWithdrawn { .. } => "AgreementWithdrawn",
            NotificationEvent::WebsiteFeePaid { .. } => "WebsiteFeePaid",
            NotificationEvent::AgreementActivated { .. } => "AgreementActivated",
            NotificationEvent::AgreementExpired { .. } => "AgreementExpired",
            NotificationEvent::ClaimSubmitted { .. } => "ClaimSubmitted",
            NotificationEvent::ClaimTenantNotified { .. } => "ClaimTenantNotified",
            NotificationEvent::ClaimResolved { .. } => "ClaimResolved",
            NotificationEvent::ClaimEscalated { .. } => "ClaimEscalated",
            NotificationEvent::DepositReleased { .. } => "DepositReleased",
        }
    }
}

/// Error returned by a notification adapter
///
/// Dispatch failures are logged by the caller and never block the core
/// transition that produced the event.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Dispatch failed: {message}")]
    DispatchFailed { message: String },
}

/// Fire-and-forget event delivery
pub trait NotificationDispatcher: Send + Sync {
    fn emit(&self, event: NotificationEvent) -> Result<(), NotificationError>;
}

/// Dispatcher that drops every event, for wiring the core without delivery
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl NotificationDispatcher for NullDispatcher {
    fn emit(&self, _event: NotificationEvent) -> Result<(), NotificationError> {
        Ok(())
    }
}
