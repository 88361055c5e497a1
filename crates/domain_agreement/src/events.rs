//! Domain events for the agreement aggregate
//!
//! Events capture significant lifecycle occurrences. The application layer
//! drains them after a committed mutation and maps them to notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgreementId, DepositId, PartyRole};

/// Domain events emitted by the TenancyAgreement aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgreementEvent {
    /// Agreement created from an accepted rental application
    Opened {
        agreement_id: AgreementId,
        signature_deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// One party signed
    Signed {
        agreement_id: AgreementId,
        by: PartyRole,
        timestamp: DateTime<Utc>,
    },

    /// Both parties signed; fee payment is due
    FullySigned {
        agreement_id: AgreementId,
        payment_deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// A party withdrew before the other committed
    Withdrawn {
        agreement_id: AgreementId,
        by: PartyRole,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The one-time agreement fee was paid
    FeePaid {
        agreement_id: AgreementId,
        reference: String,
        deposit_deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// Deposit paid; the agreement is active and escrow is open
    Activated {
        agreement_id: AgreementId,
        deposit_id: DepositId,
        timestamp: DateTime<Utc>,
    },

    /// A stage deadline passed before the stage completed
    Expired {
        agreement_id: AgreementId,
        deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// Administratively cancelled
    Cancelled {
        agreement_id: AgreementId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl AgreementEvent {
    /// Returns the agreement ID associated with this event
    pub fn agreement_id(&self) -> AgreementId {
        match self {
            AgreementEvent::Opened { agreement_id, .. } => *agreement_id,
            AgreementEvent::Signed { agreement_id, .. } => *agreement_id,
            AgreementEvent::FullySigned { agreement_id, .. } => *agreement_id,
            AgreementEvent::Withdrawn { agreement_id, .. } => *agreement_id,
            AgreementEvent::FeePaid { agreement_id, .. } => *agreement_id,
            AgreementEvent::Activated { agreement_id, .. } => *agreement_id,
            AgreementEvent::Expired { agreement_id, .. } => *agreement_id,
            AgreementEvent::Cancelled { agreement_id, .. } => *agreement_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AgreementEvent::Opened { timestamp, .. } => *timestamp,
            AgreementEvent::Signed { timestamp, .. } => *timestamp,
            AgreementEvent::FullySigned { timestamp, .. } => *timestamp,
            AgreementEvent::Withdrawn { timestamp, .. } => *timestamp,
            AgreementEvent::FeePaid { timestamp, .. } => *timestamp,
            AgreementEvent::Activated { timestamp, .. } => *timestamp,
            AgreementEvent::Expired { timestamp, .. } => *timestamp,
            AgreementEvent::Cancelled { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            AgreementEvent::Opened { .. } => "AgreementOpened",
            AgreementEvent::Signed { .. } => "AgreementSigned",
            AgreementEvent::FullySigned { .. } => "AgreementFullySigned",
            AgreementEvent::Withdrawn { .. } => "AgreementWithdrawn",
            AgreementEvent::FeePaid { .. } => "AgreementFeePaid",
            AgreementEvent::Activated { .. } => "AgreementActivated",
            AgreementEvent::Expired { .. } => "AgreementExpired",
            AgreementEvent::Cancelled { .. } => "AgreementCancelled",
        }
    }
}
