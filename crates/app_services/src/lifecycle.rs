//! Agreement lifecycle service
//!
//! Orchestrates the TenancyAgreement aggregate through the store's
//! optimistic-commit discipline, maps domain events to notifications, and
//! drives the payment gateway for the two charged stages.
//!
//! Gateway calls are the only suspension point: the charge happens first,
//! outside any lock, and the lifecycle transition commits only after the
//! gateway confirms success. A failed or timed-out charge surfaces as a
//! retryable error and leaves the agreement untouched.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{
    AgreementId, Clock, NotificationDispatcher, NotificationEvent, PartyRole, PaymentGateway,
    PaymentOutcome,
};
use domain_agreement::{AgreementEvent, TenancyAgreement};
use domain_escrow::Deposit;

use crate::error::ServiceError;
use crate::store::{CoreStore, StoreError};

/// Outcome of one expiry sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirySweepReport {
    /// Non-terminal agreements examined
    pub examined: usize,
    /// Agreements transitioned to `expired`
    pub expired: usize,
    /// Commits lost to a concurrent user action; the user action won
    pub conflicts: usize,
}

/// Application service for the agreement lifecycle
pub struct LifecycleService {
    store: Arc<CoreStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl LifecycleService {
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

    /// Registers a newly built agreement
    pub fn open_agreement(
        &self,
        mut agreement: TenancyAgreement,
    ) -> Result<AgreementId, ServiceError> {
        self.store.insert_agreement(&mut agreement)?;
        let id = agreement.id();
        self.publish(&mut agreement);
        info!(agreement = %id, "agreement opened");
        Ok(id)
    }

    /// Loads the current snapshot of an agreement
    pub fn agreement(&self, id: AgreementId) -> Result<TenancyAgreement, ServiceError> {
        Ok(self.store.load_agreement(id)?)
    }

    /// Records a party's signature
    pub fn sign(
        &self,
        id: AgreementId,
        party: PartyRole,
    ) -> Result<TenancyAgreement, ServiceError> {
        let mut agreement = self.store.load_agreement(id)?;
        agreement.sign(party, self.clock.now())?;
        self.store.commit_agreement(&mut agreement)?;
        self.publish(&mut agreement);
        info!(agreement = %id, %party, status = agreement.status_name(), "signature recorded");
        Ok(agreement)
    }

    /// Withdraws the landlord's offer
    pub fn withdraw_offer(
        &self,
        id: AgreementId,
        reason: &str,
    ) -> Result<TenancyAgreement, ServiceError> {
        let mut agreement = self.store.load_agreement(id)?;
        agreement.withdraw_offer(reason, self.clock.now())?;
        self.store.commit_agreement(&mut agreement)?;
        self.publish(&mut agreement);
        info!(agreement = %id, "offer withdrawn");
        Ok(agreement)
    }

    /// Withdraws the tenant's signature
    pub fn withdraw_signature(
        &self,
        id: AgreementId,
        reason: &str,
    ) -> Result<TenancyAgreement, ServiceError> {
        let mut agreement = self.store.load_agreement(id)?;
        agreement.withdraw_signature(reason, self.clock.now())?;
        self.store.commit_agreement(&mut agreement)?;
        self.publish(&mut agreement);
        info!(agreement = %id, "signature withdrawn");
        Ok(agreement)
    }

    /// Records a fee-charge outcome reported by the caller
    pub fn record_fee_payment(
        &self,
        id: AgreementId,
        outcome: &PaymentOutcome,
    ) -> Result<TenancyAgreement, ServiceError> {
        let mut agreement = self.store.load_agreement(id)?;
        agreement.record_fee_paid(outcome, self.clock.now())?;
        self.store.commit_agreement(&mut agreement)?;
        self.publish(&mut agreement);
        info!(agreement = %id, "website fee recorded");
        Ok(agreement)
    }

    /// Activates the agreement, creating its deposit atomically
    pub fn activate(
        &self,
        id: AgreementId,
        outcome: &PaymentOutcome,
    ) -> Result<(TenancyAgreement, Deposit), ServiceError> {
        let now = self.clock.now();
        let mut agreement = self.store.load_agreement(id)?;
        let mut deposit = Deposit::open(
            agreement.id(),
            agreement.security_deposit(),
            agreement.lease_term().end,
            agreement.timezone(),
            now,
        )?;
        agreement.activate(outcome, deposit.id(), now)?;
        self.store.commit_activation(&mut agreement, &mut deposit)?;
        self.publish(&mut agreement);
        deposit.take_events();
        info!(agreement = %id, deposit = %deposit.id(), "agreement activated");
        Ok((agreement, deposit))
    }

    /// Charges the agreement fee, then records the outcome
    ///
    /// The charge happens before any state change; a gateway error or
    /// failed outcome leaves the agreement in `pending_payment`.
    pub async fn charge_fee(
        &self,
        id: AgreementId,
        gateway: &dyn PaymentGateway,
    ) -> Result<TenancyAgreement, ServiceError> {
        let agreement = self.store.load_agreement(id)?;
        let outcome = gateway
            .charge_or_authorize(agreement.agreement_fee(), agreement.tenant_id())
            .await?;
        self.record_fee_payment(id, &outcome)
    }

    /// Charges the security deposit, then activates
    pub async fn charge_deposit(
        &self,
        id: AgreementId,
        gateway: &dyn PaymentGateway,
    ) -> Result<(TenancyAgreement, Deposit), ServiceError> {
        let agreement = self.store.load_agreement(id)?;
        let outcome = gateway
            .charge_or_authorize(agreement.security_deposit(), agreement.tenant_id())
            .await?;
        self.activate(id, &outcome)
    }

    /// Expires every non-terminal agreement past its stage deadline
    ///
    /// Called by the scheduler on every tick. A commit lost to a racing
    /// user action is counted and skipped; the user action won.
    pub fn run_expiry_sweep(&self) -> ExpirySweepReport {
        let now = self.clock.now();
        let mut report = ExpirySweepReport::default();

        for id in self.store.non_terminal_agreement_ids() {
            let mut agreement = match self.store.load_agreement(id) {
                Ok(agreement) => agreement,
                Err(_) => continue,
            };
            report.examined += 1;

            if !agreement.sweep_expire(now) {
                continue;
            }

            match self.store.commit_agreement(&mut agreement) {
                Ok(()) => {
                    report.expired += 1;
                    self.publish(&mut agreement);
                    info!(agreement = %id, "agreement expired by sweep");
                }
                Err(StoreError::ConcurrentModification { .. }) => {
                    report.conflicts += 1;
                }
                Err(err) => {
                    warn!(agreement = %id, error = %err, "expiry sweep commit failed");
                }
            }
        }

        report
    }

    /// Maps committed domain events to notifications and dispatches them
    ///
    /// Dispatch failures are logged and never fail the transition.
    fn publish(&self, agreement: &mut TenancyAgreement) {
        for event in agreement.take_events() {
            let notification = match &event {
                AgreementEvent::Signed { agreement_id, by, .. } => {
                    Some(NotificationEvent::AgreementSigned {
                        agreement_id: *agreement_id,
                        by: *by,
                    })
                }
                AgreementEvent::FullySigned { agreement_id, .. } => {
                    Some(NotificationEvent::AgreementFullySigned {
                        agreement_id: *agreement_id,
                    })
                }
                AgreementEvent::Withdrawn { agreement_id, by, .. } => {
                    Some(NotificationEvent::AgreementWithdrawn {
                        agreement_id: *agreement_id,
                        by: *by,
                    })
                }
                AgreementEvent::FeePaid { agreement_id, .. } => {
                    Some(NotificationEvent::WebsiteFeePaid {
                        agreement_id: *agreement_id,
                    })
                }
                AgreementEvent::Activated {
                    agreement_id,
                    deposit_id,
                    ..
                } => Some(NotificationEvent::AgreementActivated {
                    agreement_id: *agreement_id,
                    deposit_id: *deposit_id,
                }),
                AgreementEvent::Expired { agreement_id, .. } => {
                    Some(NotificationEvent::AgreementExpired {
                        agreement_id: *agreement_id,
                    })
                }
                AgreementEvent::Opened { .. } | AgreementEvent::Cancelled { .. } => None,
            };

            if let Some(notification) = notification {
                if let Err(err) = self.notifier.emit(notification) {
                    warn!(
                        event = event.event_type(),
                        error = %err,
                        "notification dispatch failed"
                    );
                }
            }
        }
    }
}
