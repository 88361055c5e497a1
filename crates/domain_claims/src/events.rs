//! Domain events for the claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DepositId, Money};

use crate::claim::{SettlementRoute, TenantResponse};

/// Domain events emitted by the DepositClaim aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// Landlord raised a deduction claim
    Submitted {
        claim_id: ClaimId,
        deposit_id: DepositId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Claim formally surfaced to the tenant
    TenantNotified {
        claim_id: ClaimId,
        timestamp: DateTime<Utc>,
    },

    /// Tenant responded
    TenantResponded {
        claim_id: ClaimId,
        response: TenantResponse,
        timestamp: DateTime<Utc>,
    },

    /// Claim settled; the amount is ready to release
    Resolved {
        claim_id: ClaimId,
        settled_amount: Money,
        route: SettlementRoute,
        timestamp: DateTime<Utc>,
    },

    /// Claim handed to external mediation
    Escalated {
        claim_id: ClaimId,
        timestamp: DateTime<Utc>,
    },
}

impl ClaimEvent {
    /// Returns the claim ID associated with this event
    pub fn claim_id(&self) -> ClaimId {
        match self {
            ClaimEvent::Submitted { claim_id, .. } => *claim_id,
            ClaimEvent::TenantNotified { claim_id, .. } => *claim_id,
            ClaimEvent::TenantResponded { claim_id, .. } => *claim_id,
            ClaimEvent::Resolved { claim_id, .. } => *claim_id,
            ClaimEvent::Escalated { claim_id, .. } => *claim_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::Submitted { timestamp, .. } => *timestamp,
            ClaimEvent::TenantNotified { timestamp, .. } => *timestamp,
            ClaimEvent::TenantResponded { timestamp, .. } => *timestamp,
            ClaimEvent::Resolved { timestamp, .. } => *timestamp,
            ClaimEvent::Escalated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::Submitted { .. } => "ClaimSubmitted",
            ClaimEvent::TenantNotified { .. } => "ClaimTenantNotified",
            ClaimEvent::TenantResponded { .. } => "ClaimTenantResponded",
            ClaimEvent::Resolved { .. } => "ClaimResolved",
            ClaimEvent::Escalated { .. } => "ClaimEscalated",
        }
    }
}
