//! Domain events for the deposit aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgreementId, ClaimId, DepositId, Money};

/// Domain events emitted by the Deposit aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EscrowEvent {
    /// Deposit created at agreement activation
    Opened {
        deposit_id: DepositId,
        agreement_id: AgreementId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Funds contested by an open claim
    Disputed {
        deposit_id: DepositId,
        timestamp: DateTime<Utc>,
    },

    /// A settled claim amount moved to the landlord
    SettlementApplied {
        deposit_id: DepositId,
        claim_id: ClaimId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// The window-close sweep refunded the uncontested remainder
    RemainderAutoReleased {
        deposit_id: DepositId,
        refunded: Money,
        still_held: Money,
        timestamp: DateTime<Utc>,
    },

    /// Nothing remains in escrow
    FullyReleased {
        deposit_id: DepositId,
        refunded: Money,
        timestamp: DateTime<Utc>,
    },
}

impl EscrowEvent {
    /// Returns the deposit ID associated with this event
    pub fn deposit_id(&self) -> DepositId {
        match self {
            EscrowEvent::Opened { deposit_id, .. } => *deposit_id,
            EscrowEvent::Disputed { deposit_id, .. } => *deposit_id,
            EscrowEvent::SettlementApplied { deposit_id, .. } => *deposit_id,
            EscrowEvent::RemainderAutoReleased { deposit_id, .. } => *deposit_id,
            EscrowEvent::FullyReleased { deposit_id, .. } => *deposit_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EscrowEvent::Opened { timestamp, .. } => *timestamp,
            EscrowEvent::Disputed { timestamp, .. } => *timestamp,
            EscrowEvent::SettlementApplied { timestamp, .. } => *timestamp,
            EscrowEvent::RemainderAutoReleased { timestamp, .. } => *timestamp,
            EscrowEvent::FullyReleased { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            EscrowEvent::Opened { .. } => "DepositOpened",
            EscrowEvent::Disputed { .. } => "DepositDisputed",
            EscrowEvent::SettlementApplied { .. } => "SettlementApplied",
            EscrowEvent::RemainderAutoReleased { .. } => "RemainderAutoReleased",
            EscrowEvent::FullyReleased { .. } => "DepositFullyReleased",
        }
    }
}
