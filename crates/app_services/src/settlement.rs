//! Claim settlement service
//!
//! Orchestrates the claim resolution engine and the escrow ledger. All fund
//! movements go through the deposit's ledger entry points; this service
//! only decides which entry point a committed claim transition triggers.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{
    ClaimId, Clock, DepositId, EvidenceId, Money, NotificationDispatcher, NotificationEvent,
};
use domain_claims::{
    escrow_hold, submit_claim, ClaimRequest, DepositClaim, LandlordDecision, TenantResponse,
};
use domain_escrow::{Deposit, EscrowError};

use crate::error::ServiceError;
use crate::store::{CoreStore, StoreError};

/// Outcome of one inspection-close sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectionSweepReport {
    /// Unreleased deposits examined
    pub examined: usize,
    /// Deposits whose undisputed remainder was refunded
    pub released: usize,
    /// Commits lost to a concurrent settlement; retried next tick
    pub conflicts: usize,
}

/// Application service for claims and escrow release
pub struct SettlementService {
    store: Arc<CoreStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl SettlementService {
    pub fn new(
        store: Arc<CoreStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
        }
    }

    /// Loads the current snapshot of a deposit
    pub fn deposit(&self, id: DepositId) -> Result<Deposit, ServiceError> {
        Ok(self.store.load_deposit(id)?)
    }

    /// Loads the current snapshot of a claim
    pub fn claim(&self, id: ClaimId) -> Result<DepositClaim, ServiceError> {
        Ok(self.store.load_claim(id)?)
    }

    /// Raises a deduction claim during the inspection window
    pub fn submit_claim(
        &self,
        deposit_id: DepositId,
        request: ClaimRequest,
    ) -> Result<DepositClaim, ServiceError> {
        let now = self.clock.now();
        let mut deposit = self.store.load_deposit(deposit_id)?;
        let existing = self.store.claims_for_deposit(deposit_id);

        let mut claim = submit_claim(&deposit, &existing, request, now)?;
        deposit.mark_disputed(now)?;
        self.store.commit_claim_submission(&mut deposit, &mut claim)?;

        deposit.take_events();
        claim.take_events();
        self.emit(NotificationEvent::ClaimSubmitted {
            deposit_id,
            claim_id: claim.id(),
        });
        info!(deposit = %deposit_id, claim = %claim.id(), amount = %claim.claimed_amount(), "claim submitted");
        Ok(claim)
    }

    /// Formally surfaces a claim to the tenant
    pub fn notify_tenant(&self, claim_id: ClaimId) -> Result<DepositClaim, ServiceError> {
        let mut claim = self.store.load_claim(claim_id)?;
        claim.mark_tenant_notified(self.clock.now())?;
        self.store.commit_claim(&mut claim)?;

        claim.take_events();
        self.emit(NotificationEvent::ClaimTenantNotified { claim_id });
        info!(claim = %claim_id, "tenant notified");
        Ok(claim)
    }

    /// Records the tenant's response to a claim
    ///
    /// A full acceptance settles immediately: the claimed amount moves to
    /// the landlord in the same commit.
    pub fn tenant_respond(
        &self,
        claim_id: ClaimId,
        response: TenantResponse,
        explanation: Option<String>,
        evidence: Vec<EvidenceId>,
    ) -> Result<DepositClaim, ServiceError> {
        let now = self.clock.now();
        let mut claim = self.store.load_claim(claim_id)?;
        let settlement = claim.tenant_respond(response, explanation, evidence, now)?;

        match settlement {
            Some(amount) => self.settle(&mut claim, amount)?,
            None => self.store.commit_claim(&mut claim)?,
        }

        claim.take_events();
        self.emit_resolution(&claim, settlement.is_some());
        info!(claim = %claim_id, status = claim.status_name(), "tenant responded");
        Ok(claim)
    }

    /// Records the landlord's decision on a disputed claim
    pub fn landlord_respond(
        &self,
        claim_id: ClaimId,
        decision: LandlordDecision,
        notes: Option<String>,
    ) -> Result<DepositClaim, ServiceError> {
        let now = self.clock.now();
        let mut claim = self.store.load_claim(claim_id)?;
        let settlement = claim.landlord_respond(decision, notes, now)?;

        match settlement {
            Some(amount) => self.settle(&mut claim, amount)?,
            None => self.store.commit_claim(&mut claim)?,
        }

        claim.take_events();
        match decision {
            LandlordDecision::AcceptCounter => {
                self.emit(NotificationEvent::ClaimResolved { claim_id })
            }
            LandlordDecision::Escalate => {
                self.emit(NotificationEvent::ClaimEscalated { claim_id })
            }
        }
        info!(claim = %claim_id, status = claim.status_name(), "landlord responded");
        Ok(claim)
    }

    /// Records the outcome mediation reported for an escalated claim
    ///
    /// The settled part moves to the landlord; if the window has closed,
    /// whatever the escalation was holding beyond it is refunded in the
    /// same commit.
    pub fn record_mediation_outcome(
        &self,
        claim_id: ClaimId,
        amount: Money,
    ) -> Result<(DepositClaim, Deposit), ServiceError> {
        let now = self.clock.now();
        let mut claim = self.store.load_claim(claim_id)?;
        let settled = claim.record_mediation_outcome(amount, now)?;

        let mut deposit = self.store.load_deposit(claim.deposit_id())?;
        if settled.is_positive() {
            deposit.apply_claim_settlement(claim.id(), settled, now)?;
        }

        if deposit.inspection_window().has_closed(now) && !deposit.is_fully_released() {
            let hold = self.hold_excluding(&deposit, claim.id())?;
            deposit.auto_release_undisputed_remainder(hold, now)?;
        } else if self.hold_excluding(&deposit, claim.id())?.is_positive() {
            deposit.mark_disputed(now)?;
        }

        self.store.commit_settlement(&mut claim, &mut deposit)?;
        claim.take_events();
        deposit.take_events();
        self.emit(NotificationEvent::ClaimResolved { claim_id });
        info!(claim = %claim_id, settled = %settled, "mediation outcome recorded");
        Ok((claim, deposit))
    }

    /// Refunds the full remainder once the tenancy ended with no claims
    pub fn release_full(&self, deposit_id: DepositId) -> Result<Deposit, ServiceError> {
        let now = self.clock.now();
        let mut deposit = self.store.load_deposit(deposit_id)?;

        let window = deposit.inspection_window();
        if window.not_yet_open(now) {
            return Err(EscrowError::TenancyNotEnded {
                opens_at: window.opens_at(),
            }
            .into());
        }

        let claims = self.store.claims_for_deposit(deposit_id);
        let held = escrow_hold(&claims, Money::zero(deposit.total_amount().currency()))
            .map_err(ServiceError::Claim)?;
        if held.is_positive() {
            return Err(EscrowError::OpenClaimsRemain { held }.into());
        }

        deposit.release_full(now)?;
        self.store.commit_deposit(&mut deposit)?;
        deposit.take_events();
        self.emit(NotificationEvent::DepositReleased { deposit_id });
        info!(deposit = %deposit_id, "deposit fully released");
        Ok(deposit)
    }

    /// Auto-releases undisputed remainders for closed inspection windows
    ///
    /// Called by the scheduler on every tick. Only amounts tied to an open
    /// or escalated claim stay locked past the 7-day window.
    pub fn run_inspection_close_sweep(&self) -> InspectionSweepReport {
        let now = self.clock.now();
        let mut report = InspectionSweepReport::default();

        for id in self.store.unreleased_deposit_ids() {
            let mut deposit = match self.store.load_deposit(id) {
                Ok(deposit) => deposit,
                Err(_) => continue,
            };
            report.examined += 1;

            if !deposit.inspection_window().has_closed(now) {
                continue;
            }

            let claims = self.store.claims_for_deposit(id);
            let zero = Money::zero(deposit.total_amount().currency());
            let held = match escrow_hold(&claims, zero) {
                Ok(held) => held,
                Err(err) => {
                    warn!(deposit = %id, error = %err, "hold computation failed");
                    continue;
                }
            };

            let releasable = deposit.remaining_in_escrow().amount() > held.amount();
            if !releasable {
                continue;
            }

            match deposit.auto_release_undisputed_remainder(held, now) {
                Ok(refunded) if refunded.is_positive() => {
                    match self.store.commit_deposit(&mut deposit) {
                        Ok(()) => {
                            report.released += 1;
                            deposit.take_events();
                            self.emit(NotificationEvent::DepositReleased { deposit_id: id });
                            info!(deposit = %id, %refunded, "undisputed remainder released");
                        }
                        Err(StoreError::ConcurrentModification { .. }) => {
                            report.conflicts += 1;
                        }
                        Err(err) => {
                            warn!(deposit = %id, error = %err, "inspection sweep commit failed");
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(deposit = %id, error = %err, "auto release failed");
                }
            }
        }

        report
    }

    /// Applies a settlement and re-marks the dispute flag for other holds
    fn settle(&self, claim: &mut DepositClaim, amount: Money) -> Result<(), ServiceError> {
        let now = self.clock.now();
        let mut deposit = self.store.load_deposit(claim.deposit_id())?;
        deposit.apply_claim_settlement(claim.id(), amount, now)?;

        if self.hold_excluding(&deposit, claim.id())?.is_positive() {
            deposit.mark_disputed(now)?;
        }

        self.store.commit_settlement(claim, &mut deposit)?;
        deposit.take_events();
        Ok(())
    }

    /// Escrow held by every claim on the deposit except the given one
    fn hold_excluding(
        &self,
        deposit: &Deposit,
        excluded: ClaimId,
    ) -> Result<Money, ServiceError> {
        let others: Vec<_> = self
            .store
            .claims_for_deposit(deposit.id())
            .into_iter()
            .filter(|c| c.id() != excluded)
            .collect();
        escrow_hold(&others, Money::zero(deposit.total_amount().currency()))
            .map_err(ServiceError::Claim)
    }

    fn emit(&self, event: NotificationEvent) {
        if let Err(err) = self.notifier.emit(event) {
            warn!(error = %err, "notification dispatch failed");
        }
    }

    fn emit_resolution(&self, claim: &DepositClaim, settled: bool) {
        if settled {
            self.emit(NotificationEvent::ClaimResolved {
                claim_id: claim.id(),
            });
        }
    }
}
