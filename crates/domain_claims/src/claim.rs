//! DepositClaim aggregate
//!
//! A claim is a landlord-raised request to deduct part of the deposit for a
//! specific reason. It is owned by exactly one deposit and frozen once it
//! reaches a terminal status.
//!
//! # Invariants
//!
//! - The final settled amount never exceeds the claimed amount
//! - The tenant responds at most once; a partial acceptance carries a
//!   counter-amount strictly between zero and the claimed amount
//! - `accept_counter` is only available when the dispute carries a
//!   counter-amount; a flat rejection offers escalation only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DepositId, EvidenceId, Money};

use crate::error::ClaimError;
use crate::events::ClaimEvent;

/// Category of a deduction claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimCategory {
    Damage,
    Cleaning,
    UnpaidUtilities,
    MissingItems,
    Other,
}

/// How a settled claim reached its final amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementRoute {
    /// Tenant accepted the full claimed amount
    FullClaim,
    /// Landlord accepted the tenant's counter-offer
    CounterOffer,
    /// Out-of-scope mediation reported an outcome
    Mediation,
}

/// Claim lifecycle status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Raised by the landlord, not yet surfaced to the tenant
    Submitted,
    /// Formally surfaced to the tenant; awaiting their response
    TenantNotified,
    /// Tenant rejected or partially accepted; awaiting the landlord
    Disputed,
    /// Settled; the amount has been released to the landlord
    Accepted {
        settled_amount: Money,
        route: SettlementRoute,
    },
    /// Handed to external mediation; funds stay locked in escrow
    Escalated,
}

impl ClaimStatus {
    /// Returns the status name used in errors and caller-facing reads
    pub fn name(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::TenantNotified => "tenant_notified",
            ClaimStatus::Disputed => "disputed",
            ClaimStatus::Accepted { .. } => "accepted",
            ClaimStatus::Escalated => "escalated",
        }
    }
}

/// The tenant's answer to a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum TenantResponse {
    /// Accept the full claimed amount
    Accept,
    /// Offer a smaller amount
    PartialAccept { counter_amount: Money },
    /// Reject the claim outright
    Reject,
}

/// The tenant's response as recorded on the claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantResponseRecord {
    pub response: TenantResponse,
    pub explanation: Option<String>,
    pub evidence: Vec<EvidenceId>,
    pub responded_at: DateTime<Utc>,
}

/// The landlord's decision on a disputed claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandlordDecision {
    /// Settle at the tenant's counter-amount
    AcceptCounter,
    /// Hand the dispute to external mediation
    Escalate,
}

/// The landlord's dispute decision as recorded on the claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeDecisionRecord {
    pub decision: LandlordDecision,
    pub notes: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// A deduction claim against a deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositClaim {
    /// Unique identifier
    id: ClaimId,
    /// The deposit this claim draws on
    deposit_id: DepositId,
    /// Amount the landlord claims
    claimed_amount: Money,
    /// Category of the deduction
    category: ClaimCategory,
    /// Short title
    title: String,
    /// Detailed description
    description: String,
    /// Landlord's supporting evidence (opaque references)
    evidence: Vec<EvidenceId>,
    /// Current status
    status: ClaimStatus,
    /// Tenant's response, once given
    tenant_response: Option<TenantResponseRecord>,
    /// Landlord's dispute decision, once given
    landlord_decision: Option<DisputeDecisionRecord>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<ClaimEvent>,
    /// Monotonic revision used by the store's optimistic commit
    version: u64,
    /// When the claim was raised
    submitted_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl DepositClaim {
    /// Creates a submitted claim
    ///
    /// Window and escrow-cap validation happens in
    /// [`resolution::submit_claim`](crate::resolution::submit_claim); this
    /// constructor only fixes the claim's own fields.
    pub(crate) fn submitted(
        deposit_id: DepositId,
        claimed_amount: Money,
        category: ClaimCategory,
        title: String,
        description: String,
        evidence: Vec<EvidenceId>,
        now: DateTime<Utc>,
    ) -> Self {
        let id = ClaimId::new_v7();
        Self {
            id,
            deposit_id,
            claimed_amount,
            category,
            title,
            description,
            evidence,
            status: ClaimStatus::Submitted,
            tenant_response: None,
            landlord_decision: None,
            events: vec![ClaimEvent::Submitted {
                claim_id: id,
                deposit_id,
                amount: claimed_amount,
                timestamp: now,
            }],
            version: 1,
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Returns the claim ID
    pub fn id(&self) -> ClaimId {
        self.id
    }

    /// Returns the owning deposit ID
    pub fn deposit_id(&self) -> DepositId {
        self.deposit_id
    }

    /// Returns the claimed amount
    pub fn claimed_amount(&self) -> Money {
        self.claimed_amount
    }

    /// Returns the category
    pub fn category(&self) -> ClaimCategory {
        self.category
    }

    /// Returns the title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the landlord's evidence references
    pub fn evidence(&self) -> &[EvidenceId] {
        &self.evidence
    }

    /// Returns the current status
    pub fn status(&self) -> &ClaimStatus {
        &self.status
    }

    /// Returns the status name
    pub fn status_name(&self) -> &'static str {
        self.status.name()
    }

    /// Returns the tenant's response, once given
    pub fn tenant_response(&self) -> Option<&TenantResponseRecord> {
        self.tenant_response.as_ref()
    }

    /// Returns the landlord's dispute decision, once given
    pub fn landlord_decision(&self) -> Option<&DisputeDecisionRecord> {
        self.landlord_decision.as_ref()
    }

    /// Returns the tenant's counter-amount, if the response carried one
    pub fn counter_amount(&self) -> Option<Money> {
        match self.tenant_response.as_ref().map(|r| &r.response) {
            Some(TenantResponse::PartialAccept { counter_amount }) => Some(*counter_amount),
            _ => None,
        }
    }

    /// Returns the settled amount once the claim is accepted
    pub fn settled_amount(&self) -> Option<Money> {
        match &self.status {
            ClaimStatus::Accepted { settled_amount, .. } => Some(*settled_amount),
            _ => None,
        }
    }

    /// True while the claim still awaits a party's action
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            ClaimStatus::Submitted | ClaimStatus::TenantNotified | ClaimStatus::Disputed
        )
    }

    /// True once the claim is frozen (settled or escalated)
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ClaimStatus::Accepted { .. } | ClaimStatus::Escalated)
    }

    /// Amount this claim keeps locked in escrow
    ///
    /// Open and escalated claims reserve their full claimed amount; a
    /// settled claim has already been debited and reserves nothing.
    pub fn escrow_hold(&self) -> Money {
        match self.status {
            ClaimStatus::Accepted { .. } => Money::zero(self.claimed_amount.currency()),
            _ => self.claimed_amount,
        }
    }

    /// Returns the revision counter
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bumps the revision counter; called by the store on commit
    pub fn advance_version(&mut self) {
        self.version += 1;
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<ClaimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns when the claim was raised
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the last update timestamp
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the claim as formally surfaced to the tenant
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the claim is `submitted`
    pub fn mark_tenant_notified(&mut self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Submitted {
            return Err(ClaimError::invalid_transition(
                self.status_name(),
                "mark_tenant_notified",
            ));
        }

        self.status = ClaimStatus::TenantNotified;
        self.updated_at = now;
        self.events.push(ClaimEvent::TenantNotified {
            claim_id: self.id,
            timestamp: now,
        });
        Ok(())
    }

    /// Records the tenant's response
    ///
    /// Returns the settlement amount when the response resolves the claim
    /// immediately (a full acceptance); the caller applies it through the
    /// escrow ledger.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the claim is `submitted` or
    ///   `tenant_notified` (each claim takes exactly one response)
    /// - `InvalidCounterAmount` unless a partial acceptance's counter is
    ///   strictly between zero and the claimed amount
    pub fn tenant_respond(
        &mut self,
        response: TenantResponse,
        explanation: Option<String>,
        evidence: Vec<EvidenceId>,
        now: DateTime<Utc>,
    ) -> Result<Option<Money>, ClaimError> {
        if !matches!(
            self.status,
            ClaimStatus::Submitted | ClaimStatus::TenantNotified
        ) {
            return Err(ClaimError::invalid_transition(
                self.status_name(),
                "tenant_respond",
            ));
        }

        let settlement = match &response {
            TenantResponse::Accept => {
                self.status = ClaimStatus::Accepted {
                    settled_amount: self.claimed_amount,
                    route: SettlementRoute::FullClaim,
                };
                Some(self.claimed_amount)
            }
            TenantResponse::PartialAccept { counter_amount } => {
                if counter_amount.currency() != self.claimed_amount.currency()
                    || !counter_amount.is_positive()
                    || counter_amount.amount() >= self.claimed_amount.amount()
                {
                    return Err(ClaimError::InvalidCounterAmount {
                        counter: *counter_amount,
                        claimed: self.claimed_amount,
                    });
                }
                self.status = ClaimStatus::Disputed;
                None
            }
            TenantResponse::Reject => {
                self.status = ClaimStatus::Disputed;
                None
            }
        };

        self.tenant_response = Some(TenantResponseRecord {
            response: response.clone(),
            explanation,
            evidence,
            responded_at: now,
        });
        self.updated_at = now;

        self.events.push(ClaimEvent::TenantResponded {
            claim_id: self.id,
            response,
            timestamp: now,
        });
        if let Some(amount) = settlement {
            self.events.push(ClaimEvent::Resolved {
                claim_id: self.id,
                settled_amount: amount,
                route: SettlementRoute::FullClaim,
                timestamp: now,
            });
        }

        Ok(settlement)
    }

    /// Records the landlord's decision on a disputed claim
    ///
    /// Returns the settlement amount when the decision resolves the claim
    /// (accepting the counter-offer); the caller applies it through the
    /// escrow ledger. Escalation freezes the claim and returns `None`.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the claim is `disputed`
    /// - `CounterNotAvailable` when accepting a counter on a flat rejection
    pub fn landlord_respond(
        &mut self,
        decision: LandlordDecision,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<Money>, ClaimError> {
        if self.status != ClaimStatus::Disputed {
            return Err(ClaimError::invalid_transition(
                self.status_name(),
                "landlord_respond",
            ));
        }

        let settlement = match decision {
            LandlordDecision::AcceptCounter => {
                let counter = self
                    .counter_amount()
                    .ok_or(ClaimError::CounterNotAvailable)?;
                self.status = ClaimStatus::Accepted {
                    settled_amount: counter,
                    route: SettlementRoute::CounterOffer,
                };
                self.events.push(ClaimEvent::Resolved {
                    claim_id: self.id,
                    settled_amount: counter,
                    route: SettlementRoute::CounterOffer,
                    timestamp: now,
                });
                Some(counter)
            }
            LandlordDecision::Escalate => {
                self.status = ClaimStatus::Escalated;
                self.events.push(ClaimEvent::Escalated {
                    claim_id: self.id,
                    timestamp: now,
                });
                None
            }
        };

        self.landlord_decision = Some(DisputeDecisionRecord {
            decision,
            notes,
            decided_at: now,
        });
        self.updated_at = now;

        Ok(settlement)
    }

    /// Records the outcome mediation reported for an escalated claim
    ///
    /// Returns the amount to release to the landlord (possibly zero when
    /// mediation sided with the tenant).
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the claim is `escalated`
    /// - `SettlementExceedsClaim` if the outcome exceeds the claimed amount
    pub fn record_mediation_outcome(
        &mut self,
        settled_amount: Money,
        now: DateTime<Utc>,
    ) -> Result<Money, ClaimError> {
        if self.status != ClaimStatus::Escalated {
            return Err(ClaimError::invalid_transition(
                self.status_name(),
                "record_mediation_outcome",
            ));
        }
        if settled_amount.is_negative()
            || settled_amount.currency() != self.claimed_amount.currency()
            || settled_amount.amount() > self.claimed_amount.amount()
        {
            return Err(ClaimError::SettlementExceedsClaim {
                settled: settled_amount,
                claimed: self.claimed_amount,
            });
        }

        self.status = ClaimStatus::Accepted {
            settled_amount,
            route: SettlementRoute::Mediation,
        };
        self.updated_at = now;
        self.events.push(ClaimEvent::Resolved {
            claim_id: self.id,
            settled_amount,
            route: SettlementRoute::Mediation,
            timestamp: now,
        });

        Ok(settled_amount)
    }
}
