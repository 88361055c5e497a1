//! Tenancy Agreement Aggregate Root
//!
//! The TenancyAgreement aggregate is the consistency boundary for the
//! pre-tenancy lifecycle. It ensures all changes are valid and maintains
//! invariants.
//!
//! # Invariants
//!
//! - Status is a single enum; withdrawn/expired/active/cancelled are
//!   mutually exclusive
//! - Signature timestamps can only be set while the agreement is signable;
//!   once both parties have signed, status advances to the payment stage
//! - A party may withdraw only while the counter-party has not signed
//! - Every stage before `active` carries a deadline; past it the agreement
//!   is read-only until the expiry sweep commits the `expired` status
//!
//! # State Machine
//!
//! Valid transitions:
//! - PendingSignatures -> PendingSignatures (via sign, one party)
//! - PendingSignatures -> PendingPayment (via sign, both parties)
//! - PendingSignatures -> Withdrawn (via withdraw_offer / withdraw_signature)
//! - PendingPayment -> WebsiteFeePaid (via record_fee_paid)
//! - WebsiteFeePaid -> Active (via activate)
//! - any non-terminal -> Expired (via sweep_expire)
//! - any non-terminal -> Cancelled (via cancel)

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AgreementId, Countdown, Currency, DateRange, DepositId, Money, PartyId, PartyRole,
    PaymentOutcome, PropertyId, Rate, Timezone,
};

use crate::error::AgreementError;
use crate::events::AgreementEvent;

/// Hours allowed for collecting both signatures
pub const SIGNATURE_WINDOW_HOURS: i64 = 72;
/// Hours allowed for paying the one-time agreement fee
pub const FEE_PAYMENT_WINDOW_HOURS: i64 = 48;
/// Hours allowed for paying the security deposit
pub const DEPOSIT_PAYMENT_WINDOW_HOURS: i64 = 48;

/// Rent multiple held in escrow: 2 months security + 0.5 month utility
pub fn deposit_rent_multiple() -> Decimal {
    dec!(2.5)
}

/// Rate used to compute the one-time agreement fee from monthly rent
pub fn agreement_fee_rate() -> Rate {
    Rate::from_percentage(dec!(5))
}

/// Agreement lifecycle states
///
/// Each pre-activation stage carries its own deadline; terminal states
/// carry the facts of how they were reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementState {
    /// Waiting for one or both parties to sign
    PendingSignatures {
        /// Deadline for completing signature collection
        expires_at: DateTime<Utc>,
    },

    /// Both parties signed; waiting for the agreement fee
    PendingPayment {
        /// Deadline for paying the fee
        expires_at: DateTime<Utc>,
    },

    /// Fee paid; waiting for the security deposit
    WebsiteFeePaid {
        /// Deadline for paying the deposit
        expires_at: DateTime<Utc>,
        /// Processor reference of the fee charge
        fee_reference: String,
    },

    /// Deposit paid and held in escrow; the tenancy is in force
    Active {
        activated_at: DateTime<Utc>,
        /// The escrow record created atomically with activation
        deposit_id: DepositId,
    },

    /// One party withdrew before the other committed
    Withdrawn {
        by: PartyRole,
        reason: String,
        withdrawn_at: DateTime<Utc>,
    },

    /// A stage deadline passed before the stage completed
    Expired { expired_at: DateTime<Utc> },

    /// Administratively cancelled before activation
    Cancelled {
        reason: String,
        cancelled_at: DateTime<Utc>,
    },
}

impl AgreementState {
    /// Returns the status name used in errors and caller-facing reads
    pub fn name(&self) -> &'static str {
        match self {
            AgreementState::PendingSignatures { .. } => "pending_signatures",
            AgreementState::PendingPayment { .. } => "pending_payment",
            AgreementState::WebsiteFeePaid { .. } => "website_fee_paid",
            AgreementState::Active { .. } => "active",
            AgreementState::Withdrawn { .. } => "withdrawn",
            AgreementState::Expired { .. } => "expired",
            AgreementState::Cancelled { .. } => "cancelled",
        }
    }
}

/// The TenancyAgreement aggregate root
///
/// Created when a tenant's rental application is accepted; mutated by
/// sign/withdraw/pay operations and by the expiry sweep; terminal once
/// `active`, `cancelled`, `withdrawn`, or `expired`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyAgreement {
    /// Unique agreement identifier
    id: AgreementId,
    /// The property being let
    property_id: PropertyId,
    /// Landlord party
    landlord_id: PartyId,
    /// Tenant party
    tenant_id: PartyId,
    /// Monthly rent
    monthly_rent: Money,
    /// Deposit held in escrow on activation (2.5 x monthly rent)
    security_deposit: Money,
    /// One-time agreement fee, computed at creation
    agreement_fee: Money,
    /// Lease start and end dates
    lease_term: DateRange,
    /// Property jurisdiction timezone; anchors date-denominated windows
    timezone: Timezone,
    /// Agreement currency
    currency: Currency,
    /// Current lifecycle state
    state: AgreementState,
    /// When the landlord signed, if they have
    landlord_signed_at: Option<DateTime<Utc>>,
    /// When the tenant signed, if they have
    tenant_signed_at: Option<DateTime<Utc>>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<AgreementEvent>,
    /// Monotonic revision used by the store's optimistic commit
    version: u64,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl TenancyAgreement {
    /// Returns the agreement ID
    pub fn id(&self) -> AgreementId {
        self.id
    }

    /// Returns the property ID
    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    /// Returns the landlord party ID
    pub fn landlord_id(&self) -> PartyId {
        self.landlord_id
    }

    /// Returns the tenant party ID
    pub fn tenant_id(&self) -> PartyId {
        self.tenant_id
    }

    /// Returns the party ID for the given role
    pub fn party_id(&self, role: PartyRole) -> PartyId {
        match role {
            PartyRole::Landlord => self.landlord_id,
            PartyRole::Tenant => self.tenant_id,
        }
    }

    /// Returns the monthly rent
    pub fn monthly_rent(&self) -> Money {
        self.monthly_rent
    }

    /// Returns the security deposit amount fixed at creation
    pub fn security_deposit(&self) -> Money {
        self.security_deposit
    }

    /// Returns the one-time agreement fee
    pub fn agreement_fee(&self) -> Money {
        self.agreement_fee
    }

    /// Returns the lease term
    pub fn lease_term(&self) -> DateRange {
        self.lease_term
    }

    /// Returns the property jurisdiction timezone
    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Returns the agreement currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the current state
    pub fn state(&self) -> &AgreementState {
        &self.state
    }

    /// Returns the status name
    pub fn status_name(&self) -> &'static str {
        self.state.name()
    }

    /// Returns when the given party signed, if they have
    pub fn signed_at(&self, role: PartyRole) -> Option<DateTime<Utc>> {
        match role {
            PartyRole::Landlord => self.landlord_signed_at,
            PartyRole::Tenant => self.tenant_signed_at,
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
    pub fn take_events(&mut self) -> Vec<AgreementEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns the creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks if the agreement is in force
    pub fn is_active(&self) -> bool {
        matches!(self.state, AgreementState::Active { .. })
    }

    /// Checks if the lifecycle has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            AgreementState::Active { .. }
                | AgreementState::Withdrawn { .. }
                | AgreementState::Expired { .. }
                | AgreementState::Cancelled { .. }
        )
    }

    /// Checks if signatures can still be recorded
    pub fn is_signable(&self) -> bool {
        matches!(self.state, AgreementState::PendingSignatures { .. })
    }

    /// Returns the current stage deadline, None once active or terminal
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            AgreementState::PendingSignatures { expires_at }
            | AgreementState::PendingPayment { expires_at }
            | AgreementState::WebsiteFeePaid { expires_at, .. } => Some(*expires_at),
            _ => None,
        }
    }

    /// Remaining time in the current stage, rendered for observers
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        self.expires_at().map(|deadline| Countdown::until(deadline, now))
    }

    /// Whether the given party may withdraw right now
    ///
    /// Withdrawal is allowed only for the party whose counter-party has not
    /// yet signed; once both sides have signed, cancellation follows a
    /// separate process.
    pub fn can_withdraw(&self, role: PartyRole) -> bool {
        !self.is_terminal() && self.signed_at(role.counterparty()).is_none()
    }

    /// Records a party's signature
    ///
    /// If both parties are now signed, the agreement advances to
    /// `pending_payment` with a fresh deadline for the fee stage.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if not in `pending_signatures` or the party
    ///   already signed
    /// - `AgreementExpired` if the signature deadline has passed
    pub fn sign(&mut self, role: PartyRole, now: DateTime<Utc>) -> Result<(), AgreementError> {
        self.reject_if_expired()?;
        if !matches!(self.state, AgreementState::PendingSignatures { .. }) {
            return Err(AgreementError::invalid_transition(self.status_name(), "sign"));
        }
        self.ensure_not_expired(now)?;

        if self.signed_at(role).is_some() {
            return Err(AgreementError::InvalidTransition {
                from: format!("{} ({} already signed)", self.status_name(), role),
                action: "sign".to_string(),
            });
        }

        match role {
            PartyRole::Landlord => self.landlord_signed_at = Some(now),
            PartyRole::Tenant => self.tenant_signed_at = Some(now),
        }

        self.events.push(AgreementEvent::Signed {
            agreement_id: self.id,
            by: role,
            timestamp: now,
        });

        if self.landlord_signed_at.is_some() && self.tenant_signed_at.is_some() {
            let expires_at = now + Duration::hours(FEE_PAYMENT_WINDOW_HOURS);
            self.state = AgreementState::PendingPayment { expires_at };
            self.events.push(AgreementEvent::FullySigned {
                agreement_id: self.id,
                payment_deadline: expires_at,
                timestamp: now,
            });
        }

        self.updated_at = now;
        Ok(())
    }

    /// Withdraws the landlord's offer
    ///
    /// # Errors
    ///
    /// - `WithdrawalNotAllowed` if the tenant has already signed
    /// - `InvalidTransition` if the agreement is already terminal
    /// - `AgreementExpired` if the stage deadline has passed
    pub fn withdraw_offer(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AgreementError> {
        self.withdraw(PartyRole::Landlord, reason.into(), now)
    }

    /// Withdraws the tenant's signature
    ///
    /// Symmetric to [`withdraw_offer`](Self::withdraw_offer): permitted only
    /// while the landlord has not signed.
    pub fn withdraw_signature(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AgreementError> {
        self.withdraw(PartyRole::Tenant, reason.into(), now)
    }

    fn withdraw(
        &mut self,
        by: PartyRole,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<(), AgreementError> {
        self.reject_if_expired()?;
        if self.is_terminal() {
            return Err(AgreementError::invalid_transition(self.status_name(), "withdraw"));
        }
        self.ensure_not_expired(now)?;

        if self.signed_at(by.counterparty()).is_some() {
            return Err(AgreementError::WithdrawalNotAllowed {
                other_party: by.counterparty(),
            });
        }

        self.state = AgreementState::Withdrawn {
            by,
            reason: reason.clone(),
            withdrawn_at: now,
        };
        self.updated_at = now;

        self.events.push(AgreementEvent::Withdrawn {
            agreement_id: self.id,
            by,
            reason,
            timestamp: now,
        });

        Ok(())
    }

    /// Records the one-time agreement fee payment
    ///
    /// Valid only from `pending_payment`; resets the deadline for the
    /// deposit-payment stage.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if not in `pending_payment`
    /// - `AgreementExpired` if the fee deadline has passed
    /// - `GatewayFailure` if the outcome reports a failed charge; the
    ///   agreement is left exactly as it was
    pub fn record_fee_paid(
        &mut self,
        outcome: &PaymentOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), AgreementError> {
        self.reject_if_expired()?;
        if !matches!(self.state, AgreementState::PendingPayment { .. }) {
            return Err(AgreementError::invalid_transition(
                self.status_name(),
                "record_fee_payment",
            ));
        }
        self.ensure_not_expired(now)?;

        let reference = match outcome {
            PaymentOutcome::Success { reference } => reference.clone(),
            PaymentOutcome::Failure { reason } => {
                return Err(AgreementError::GatewayFailure {
                    reason: reason.clone(),
                })
            }
        };

        let expires_at = now + Duration::hours(DEPOSIT_PAYMENT_WINDOW_HOURS);
        self.state = AgreementState::WebsiteFeePaid {
            expires_at,
            fee_reference: reference.clone(),
        };
        self.updated_at = now;

        self.events.push(AgreementEvent::FeePaid {
            agreement_id: self.id,
            reference,
            deposit_deadline: expires_at,
            timestamp: now,
        });

        Ok(())
    }

    /// Activates the agreement
    ///
    /// Valid only from `website_fee_paid`. The caller creates the escrow
    /// deposit and commits it together with this transition: an agreement
    /// must never reach `active` without a deposit, and a deposit must
    /// never exist without an active agreement.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if not in `website_fee_paid`
    /// - `AgreementExpired` if the deposit deadline has passed
    /// - `GatewayFailure` if the outcome reports a failed charge
    pub fn activate(
        &mut self,
        outcome: &PaymentOutcome,
        deposit_id: DepositId,
        now: DateTime<Utc>,
    ) -> Result<(), AgreementError> {
        self.reject_if_expired()?;
        if !matches!(self.state, AgreementState::WebsiteFeePaid { .. }) {
            return Err(AgreementError::invalid_transition(self.status_name(), "activate"));
        }
        self.ensure_not_expired(now)?;

        if let PaymentOutcome::Failure { reason } = outcome {
            return Err(AgreementError::GatewayFailure {
                reason: reason.clone(),
            });
        }

        self.state = AgreementState::Active {
            activated_at: now,
            deposit_id,
        };
        self.updated_at = now;

        self.events.push(AgreementEvent::Activated {
            agreement_id: self.id,
            deposit_id,
            timestamp: now,
        });

        Ok(())
    }

    /// Cancels the agreement administratively
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the agreement is already terminal
    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AgreementError> {
        if self.is_terminal() {
            return Err(AgreementError::invalid_transition(self.status_name(), "cancel"));
        }

        let reason = reason.into();
        self.state = AgreementState::Cancelled {
            reason: reason.clone(),
            cancelled_at: now,
        };
        self.updated_at = now;

        self.events.push(AgreementEvent::Cancelled {
            agreement_id: self.id,
            reason,
            timestamp: now,
        });

        Ok(())
    }

    /// Expires the agreement if its stage deadline has passed
    ///
    /// Called by the scheduler sweep for every non-terminal agreement.
    /// Returns true if the agreement transitioned to `expired`.
    pub fn sweep_expire(&mut self, now: DateTime<Utc>) -> bool {
        let deadline = match self.expires_at() {
            Some(deadline) => deadline,
            None => return false,
        };
        if now < deadline {
            return false;
        }

        self.state = AgreementState::Expired { expired_at: now };
        self.updated_at = now;

        self.events.push(AgreementEvent::Expired {
            agreement_id: self.id,
            deadline,
            timestamp: now,
        });

        true
    }

    /// Fails with `AgreementExpired` if the sweep already committed expiry
    fn reject_if_expired(&self) -> Result<(), AgreementError> {
        if let AgreementState::Expired { expired_at } = &self.state {
            return Err(AgreementError::AgreementExpired {
                expired_at: *expired_at,
            });
        }
        Ok(())
    }

    /// Fails with `AgreementExpired` once the stage deadline has passed
    ///
    /// The sweep commits the `expired` status asynchronously; user actions
    /// arriving in between are rejected rather than silently applied.
    fn ensure_not_expired(&self, now: DateTime<Utc>) -> Result<(), AgreementError> {
        if let Some(deadline) = self.expires_at() {
            if now >= deadline {
                return Err(AgreementError::AgreementExpired {
                    expired_at: deadline,
                });
            }
        }
        Ok(())
    }
}

/// Builder for creating new agreements
///
/// Provides a fluent API for constructing TenancyAgreement instances with
/// validation of required fields.
///
/// # Example
///
/// ```rust,ignore
/// let agreement = AgreementBuilder::new()
///     .property(property_id)
///     .landlord(landlord_id)
///     .tenant(tenant_id)
///     .monthly_rent(Money::new(dec!(2000), Currency::USD))
///     .lease_term(term)
///     .build()?;
/// ```
pub struct AgreementBuilder {
    property_id: Option<PropertyId>,
    landlord_id: Option<PartyId>,
    tenant_id: Option<PartyId>,
    monthly_rent: Option<Money>,
    lease_term: Option<DateRange>,
    timezone: Timezone,
    created_at: Option<DateTime<Utc>>,
    signature_window_hours: i64,
}

impl AgreementBuilder {
    /// Creates a new agreement builder with default values
    pub fn new() -> Self {
        Self {
            property_id: None,
            landlord_id: None,
            tenant_id: None,
            monthly_rent: None,
            lease_term: None,
            timezone: Timezone::default(),
            created_at: None,
            signature_window_hours: SIGNATURE_WINDOW_HOURS,
        }
    }

    /// Sets the property
    pub fn property(mut self, id: PropertyId) -> Self {
        self.property_id = Some(id);
        self
    }

    /// Sets the landlord party
    pub fn landlord(mut self, id: PartyId) -> Self {
        self.landlord_id = Some(id);
        self
    }

    /// Sets the tenant party
    pub fn tenant(mut self, id: PartyId) -> Self {
        self.tenant_id = Some(id);
        self
    }

    /// Sets the monthly rent
    pub fn monthly_rent(mut self, rent: Money) -> Self {
        self.monthly_rent = Some(rent);
        self
    }

    /// Sets the lease term
    pub fn lease_term(mut self, term: DateRange) -> Self {
        self.lease_term = Some(term);
        self
    }

    /// Sets the property jurisdiction timezone
    pub fn timezone(mut self, tz: Timezone) -> Self {
        self.timezone = tz;
        self
    }

    /// Overrides the creation timestamp (defaults to now)
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Overrides the signature window
    pub fn signature_window_hours(mut self, hours: i64) -> Self {
        self.signature_window_hours = hours;
        self
    }

    /// Builds the agreement
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or the rent is not
    /// positive
    pub fn build(self) -> Result<TenancyAgreement, AgreementError> {
        let property_id = self
            .property_id
            .ok_or(AgreementError::MissingRequiredField("property_id".to_string()))?;
        let landlord_id = self
            .landlord_id
            .ok_or(AgreementError::MissingRequiredField("landlord_id".to_string()))?;
        let tenant_id = self
            .tenant_id
            .ok_or(AgreementError::MissingRequiredField("tenant_id".to_string()))?;
        let monthly_rent = self
            .monthly_rent
            .ok_or(AgreementError::MissingRequiredField("monthly_rent".to_string()))?;
        let lease_term = self
            .lease_term
            .ok_or(AgreementError::MissingRequiredField("lease_term".to_string()))?;

        if !monthly_rent.is_positive() {
            return Err(AgreementError::Validation(
                "monthly rent must be positive".to_string(),
            ));
        }

        let now = self.created_at.unwrap_or_else(Utc::now);
        let expires_at = now + Duration::hours(self.signature_window_hours);
        let agreement_id = AgreementId::new_v7();

        Ok(TenancyAgreement {
            id: agreement_id,
            property_id,
            landlord_id,
            tenant_id,
            monthly_rent,
            security_deposit: monthly_rent.multiply(deposit_rent_multiple()),
            agreement_fee: agreement_fee_rate().apply(&monthly_rent),
            lease_term,
            timezone: self.timezone,
            currency: monthly_rent.currency(),
            state: AgreementState::PendingSignatures { expires_at },
            landlord_signed_at: None,
            tenant_signed_at: None,
            events: vec![AgreementEvent::Opened {
                agreement_id,
                signature_deadline: expires_at,
                timestamp: now,
            }],
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Default for AgreementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn create_test_agreement() -> TenancyAgreement {
        let term = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        )
        .unwrap();

        AgreementBuilder::new()
            .property(PropertyId::new())
            .landlord(PartyId::new())
            .tenant(PartyId::new())
            .monthly_rent(Money::new(dec!(2000), Currency::USD))
            .lease_term(term)
            .created_at(test_now())
            .build()
            .unwrap()
    }

    #[test]
    fn test_agreement_creation() {
        let agreement = create_test_agreement();
        assert!(agreement.is_signable());
        assert_eq!(agreement.security_deposit().amount(), dec!(5000.00));
        assert_eq!(agreement.agreement_fee().amount(), dec!(100.00));
    }

    #[test]
    fn test_both_signatures_advance_to_payment() {
        let mut agreement = create_test_agreement();
        let now = test_now();

        agreement.sign(PartyRole::Landlord, now).unwrap();
        assert!(agreement.is_signable());

        agreement.sign(PartyRole::Tenant, now + Duration::hours(1)).unwrap();
        assert!(matches!(
            agreement.state(),
            AgreementState::PendingPayment { .. }
        ));
    }

    #[test]
    fn test_double_sign_is_rejected() {
        let mut agreement = create_test_agreement();
        let now = test_now();

        agreement.sign(PartyRole::Landlord, now).unwrap();
        let result = agreement.sign(PartyRole::Landlord, now + Duration::minutes(1));

        assert!(matches!(
            result,
            Err(AgreementError::InvalidTransition { .. })
        ));
        assert!(agreement.is_signable());
    }

    #[test]
    fn test_withdraw_blocked_after_counterparty_signed() {
        let mut agreement = create_test_agreement();
        let now = test_now();

        agreement.sign(PartyRole::Tenant, now).unwrap();
        let result = agreement.withdraw_offer("unit no longer available", now);

        assert!(matches!(
            result,
            Err(AgreementError::WithdrawalNotAllowed { .. })
        ));
    }

    #[test]
    fn test_sweep_expires_past_deadline() {
        let mut agreement = create_test_agreement();
        let late = test_now() + Duration::hours(SIGNATURE_WINDOW_HOURS + 1);

        assert!(agreement.sweep_expire(late));
        assert!(matches!(agreement.state(), AgreementState::Expired { .. }));

        let result = agreement.sign(PartyRole::Landlord, late);
        assert!(matches!(result, Err(AgreementError::AgreementExpired { .. })));
    }

    #[test]
    fn test_sign_past_deadline_fails_before_sweep() {
        let mut agreement = create_test_agreement();
        let late = test_now() + Duration::hours(SIGNATURE_WINDOW_HOURS + 1);

        let result = agreement.sign(PartyRole::Landlord, late);
        assert!(matches!(result, Err(AgreementError::AgreementExpired { .. })));
    }
}
