//! Deposit aggregate and the escrow ledger
//!
//! The Deposit is created atomically with agreement activation and never
//! destroyed; it only transitions toward a fully-released terminal state.
//!
//! # Invariants
//!
//! - `total_amount` is fixed at creation and immutable
//! - The fund breakdown always sums exactly to `total_amount`
//! - A settlement never exceeds the remaining escrow balance
//! - Breakdown mutations happen only through the ledger entry points here

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgreementId, ClaimId, DepositId, InspectionWindow, Money, Timezone};

use crate::error::EscrowError;
use crate::events::EscrowEvent;

/// Deposit lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Full amount held, no claims raised
    HeldInEscrow,
    /// At least one claim is contesting part of the funds
    Disputed,
    /// Part of the funds have been disbursed
    PartiallyReleased,
    /// Nothing remains in escrow; terminal
    FullyReleased,
}

impl DepositStatus {
    /// Returns the status name used in errors and caller-facing reads
    pub fn name(&self) -> &'static str {
        match self {
            DepositStatus::HeldInEscrow => "held_in_escrow",
            DepositStatus::Disputed => "disputed",
            DepositStatus::PartiallyReleased => "partially_released",
            DepositStatus::FullyReleased => "fully_released",
        }
    }
}

/// The three-way split of a deposit's total amount
///
/// Mutations move value between the buckets; the sum never changes. Both
/// mutating methods reject amounts exceeding the remaining balance, so the
/// breakdown cannot go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundBreakdown {
    released_to_landlord: Money,
    refunded_to_tenant: Money,
    remaining_in_escrow: Money,
}

impl FundBreakdown {
    /// Creates the opening breakdown: everything remains in escrow
    pub fn opening(total: Money) -> Self {
        Self {
            released_to_landlord: Money::zero(total.currency()),
            refunded_to_tenant: Money::zero(total.currency()),
            remaining_in_escrow: total,
        }
    }

    /// Amount disbursed to the landlord so far
    pub fn released_to_landlord(&self) -> Money {
        self.released_to_landlord
    }

    /// Amount refunded to the tenant so far
    pub fn refunded_to_tenant(&self) -> Money {
        self.refunded_to_tenant
    }

    /// Amount still held in escrow
    pub fn remaining_in_escrow(&self) -> Money {
        self.remaining_in_escrow
    }

    /// Moves `amount` from escrow to the landlord bucket
    fn release_to_landlord(&mut self, amount: Money) -> Result<(), EscrowError> {
        self.debit_remaining(amount)?;
        self.released_to_landlord = self.released_to_landlord.checked_add(&amount)?;
        Ok(())
    }

    /// Moves `amount` from escrow to the tenant bucket
    fn refund_to_tenant(&mut self, amount: Money) -> Result<(), EscrowError> {
        self.debit_remaining(amount)?;
        self.refunded_to_tenant = self.refunded_to_tenant.checked_add(&amount)?;
        Ok(())
    }

    fn debit_remaining(&mut self, amount: Money) -> Result<(), EscrowError> {
        if !amount.is_positive() {
            return Err(EscrowError::AmountNotPositive { amount });
        }
        if amount.amount() > self.remaining_in_escrow.amount() {
            return Err(EscrowError::InsufficientEscrowBalance {
                requested: amount,
                remaining: self.remaining_in_escrow,
            });
        }
        self.remaining_in_escrow = self.remaining_in_escrow.checked_sub(&amount)?;
        Ok(())
    }

    /// Checks the sum invariant against the fixed total
    pub fn verify(&self, total: Money) -> Result<(), EscrowError> {
        let sum = self
            .released_to_landlord
            .checked_add(&self.refunded_to_tenant)?
            .checked_add(&self.remaining_in_escrow)?;
        if sum != total {
            return Err(EscrowError::BreakdownMismatch {
                expected: total,
                actual: sum,
            });
        }
        Ok(())
    }
}

/// The Deposit aggregate root
///
/// One per activated agreement. Mutated only by the escrow ledger entry
/// points below and, through them, by the claim resolution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    /// Unique deposit identifier
    id: DepositId,
    /// The agreement this deposit secures
    agreement_id: AgreementId,
    /// Total held, fixed at creation
    total_amount: Money,
    /// Current status
    status: DepositStatus,
    /// Running three-way split
    breakdown: FundBreakdown,
    /// Last day of the tenancy; anchors the inspection window
    tenancy_end_date: NaiveDate,
    /// Property jurisdiction timezone
    timezone: Timezone,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<EscrowEvent>,
    /// Monotonic revision used by the store's optimistic commit
    version: u64,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Deposit {
    /// Opens a deposit at agreement activation
    ///
    /// The full amount starts in escrow.
    ///
    /// # Errors
    ///
    /// Returns error if the total is not positive
    pub fn open(
        agreement_id: AgreementId,
        total_amount: Money,
        tenancy_end_date: NaiveDate,
        timezone: Timezone,
        now: DateTime<Utc>,
    ) -> Result<Self, EscrowError> {
        if !total_amount.is_positive() {
            return Err(EscrowError::AmountNotPositive {
                amount: total_amount,
            });
        }

        let id = DepositId::new_v7();
        Ok(Self {
            id,
            agreement_id,
            total_amount,
            status: DepositStatus::HeldInEscrow,
            breakdown: FundBreakdown::opening(total_amount),
            tenancy_end_date,
            timezone,
            events: vec![EscrowEvent::Opened {
                deposit_id: id,
                agreement_id,
                total_amount,
                timestamp: now,
            }],
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the deposit ID
    pub fn id(&self) -> DepositId {
        self.id
    }

    /// Returns the agreement ID
    pub fn agreement_id(&self) -> AgreementId {
        self.agreement_id
    }

    /// Returns the fixed total
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the current status
    pub fn status(&self) -> DepositStatus {
        self.status
    }

    /// Returns the current fund breakdown
    pub fn fund_breakdown(&self) -> &FundBreakdown {
        &self.breakdown
    }

    /// Amount still held in escrow
    pub fn remaining_in_escrow(&self) -> Money {
        self.breakdown.remaining_in_escrow()
    }

    /// Amount disbursed to the landlord so far
    pub fn released_to_landlord(&self) -> Money {
        self.breakdown.released_to_landlord()
    }

    /// Amount refunded to the tenant so far
    pub fn refunded_to_tenant(&self) -> Money {
        self.breakdown.refunded_to_tenant()
    }

    /// Returns the tenancy end date
    pub fn tenancy_end_date(&self) -> NaiveDate {
        self.tenancy_end_date
    }

    /// The 7-day post-tenancy inspection window for this deposit
    pub fn inspection_window(&self) -> InspectionWindow {
        InspectionWindow::for_tenancy_end(self.tenancy_end_date, &self.timezone)
    }

    /// True once nothing remains in escrow and the status is terminal
    pub fn is_fully_released(&self) -> bool {
        self.status == DepositStatus::FullyReleased
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
    pub fn take_events(&mut self) -> Vec<EscrowEvent> {
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

    /// Marks the funds as contested by an open claim
    ///
    /// Idempotent while non-terminal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once fully released
    pub fn mark_disputed(&mut self, now: DateTime<Utc>) -> Result<(), EscrowError> {
        if self.status == DepositStatus::FullyReleased {
            return Err(EscrowError::invalid_transition(
                self.status.name(),
                "mark_disputed",
            ));
        }
        if self.status != DepositStatus::Disputed {
            self.status = DepositStatus::Disputed;
            self.updated_at = now;
            self.events.push(EscrowEvent::Disputed {
                deposit_id: self.id,
                timestamp: now,
            });
        }
        Ok(())
    }

    /// Moves a settled claim amount from escrow to the landlord
    ///
    /// Called whenever a claim reaches a terminal, landlord-favorable
    /// resolution. The amount is capped at submission time, so exceeding
    /// the remaining balance is impossible by construction; it is still
    /// checked here.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` once fully released
    /// - `InsufficientEscrowBalance` if `amount` exceeds the remainder
    /// - `AmountNotPositive` for zero or negative amounts
    pub fn apply_claim_settlement(
        &mut self,
        claim_id: ClaimId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        if self.status == DepositStatus::FullyReleased {
            return Err(EscrowError::invalid_transition(
                self.status.name(),
                "apply_claim_settlement",
            ));
        }

        self.breakdown.release_to_landlord(amount)?;
        self.breakdown.verify(self.total_amount)?;

        self.status = if self.remaining_in_escrow().is_zero() {
            DepositStatus::FullyReleased
        } else {
            DepositStatus::PartiallyReleased
        };
        self.updated_at = now;

        self.events.push(EscrowEvent::SettlementApplied {
            deposit_id: self.id,
            claim_id,
            amount,
            timestamp: now,
        });

        Ok(())
    }

    /// Refunds the entire remainder to the tenant
    ///
    /// Permitted only once the tenancy has ended and no open claims exist;
    /// the caller verifies the claim docket before invoking this.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once fully released
    pub fn release_full(&mut self, now: DateTime<Utc>) -> Result<Money, EscrowError> {
        if self.status == DepositStatus::FullyReleased {
            return Err(EscrowError::invalid_transition(
                self.status.name(),
                "release_full",
            ));
        }

        let refund = self.remaining_in_escrow();
        if refund.is_positive() {
            self.breakdown.refund_to_tenant(refund)?;
        }
        self.breakdown.verify(self.total_amount)?;

        self.status = DepositStatus::FullyReleased;
        self.updated_at = now;

        self.events.push(EscrowEvent::FullyReleased {
            deposit_id: self.id,
            refunded: refund,
            timestamp: now,
        });

        Ok(refund)
    }

    /// Refunds whatever is not held by an open claim
    ///
    /// Invoked by the inspection-window close sweep. `disputed_hold` is the
    /// sum of amounts tied to open or escalated claims; only that portion
    /// stays locked past the window.
    ///
    /// Returns the amount refunded (zero when everything is contested).
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` once fully released
    /// - `InsufficientEscrowBalance` if the hold exceeds the remainder,
    ///   which the submission-time cap makes unreachable
    pub fn auto_release_undisputed_remainder(
        &mut self,
        disputed_hold: Money,
        now: DateTime<Utc>,
    ) -> Result<Money, EscrowError> {
        if self.status == DepositStatus::FullyReleased {
            return Err(EscrowError::invalid_transition(
                self.status.name(),
                "auto_release_undisputed_remainder",
            ));
        }

        if disputed_hold.amount() > self.remaining_in_escrow().amount() {
            return Err(EscrowError::InsufficientEscrowBalance {
                requested: disputed_hold,
                remaining: self.remaining_in_escrow(),
            });
        }

        let releasable = self.remaining_in_escrow().checked_sub(&disputed_hold)?;
        if releasable.is_positive() {
            self.breakdown.refund_to_tenant(releasable)?;
        }
        self.breakdown.verify(self.total_amount)?;

        if self.remaining_in_escrow().is_zero() {
            self.status = DepositStatus::FullyReleased;
        }
        self.updated_at = now;

        if releasable.is_positive() {
            self.events.push(EscrowEvent::RemainderAutoReleased {
                deposit_id: self.id,
                refunded: releasable,
                still_held: disputed_hold,
                timestamp: now,
            });
        }

        Ok(releasable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn open_deposit(total: Money) -> Deposit {
        Deposit::open(
            AgreementId::new(),
            total,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            Timezone::default(),
            test_now(),
        )
        .unwrap()
    }

    #[test]
    fn test_opening_breakdown() {
        let deposit = open_deposit(Money::new(dec!(5000), Currency::USD));

        assert_eq!(deposit.status(), DepositStatus::HeldInEscrow);
        assert_eq!(deposit.remaining_in_escrow().amount(), dec!(5000.00));
        assert!(deposit.released_to_landlord().is_zero());
        assert!(deposit.refunded_to_tenant().is_zero());
    }

    #[test]
    fn test_settlement_moves_funds_to_landlord() {
        let mut deposit = open_deposit(Money::new(dec!(5000), Currency::USD));

        deposit
            .apply_claim_settlement(ClaimId::new(), Money::new(dec!(150), Currency::USD), test_now())
            .unwrap();

        assert_eq!(deposit.released_to_landlord().amount(), dec!(150.00));
        assert_eq!(deposit.remaining_in_escrow().amount(), dec!(4850.00));
        assert_eq!(deposit.status(), DepositStatus::PartiallyReleased);
    }

    #[test]
    fn test_settlement_cannot_exceed_remainder() {
        let mut deposit = open_deposit(Money::new(dec!(500), Currency::USD));

        let result = deposit.apply_claim_settlement(
            ClaimId::new(),
            Money::new(dec!(600), Currency::USD),
            test_now(),
        );

        assert!(matches!(
            result,
            Err(EscrowError::InsufficientEscrowBalance { .. })
        ));
        assert_eq!(deposit.remaining_in_escrow().amount(), dec!(500.00));
    }

    #[test]
    fn test_release_full_refunds_everything() {
        let mut deposit = open_deposit(Money::new(dec!(5000), Currency::USD));

        let refunded = deposit.release_full(test_now()).unwrap();

        assert_eq!(refunded.amount(), dec!(5000.00));
        assert!(deposit.is_fully_released());
        assert!(deposit.remaining_in_escrow().is_zero());
    }

    #[test]
    fn test_auto_release_keeps_disputed_hold() {
        let mut deposit = open_deposit(Money::new(dec!(5000), Currency::USD));
        deposit.mark_disputed(test_now()).unwrap();

        let released = deposit
            .auto_release_undisputed_remainder(Money::new(dec!(200), Currency::USD), test_now())
            .unwrap();

        assert_eq!(released.amount(), dec!(4800.00));
        assert_eq!(deposit.remaining_in_escrow().amount(), dec!(200.00));
        assert_eq!(deposit.status(), DepositStatus::Disputed);
    }

    #[test]
    fn test_breakdown_always_reconciles() {
        let total = Money::new(dec!(5000), Currency::USD);
        let mut deposit = open_deposit(total);

        deposit
            .apply_claim_settlement(ClaimId::new(), Money::new(dec!(150), Currency::USD), test_now())
            .unwrap();
        deposit
            .auto_release_undisputed_remainder(Money::new(dec!(200), Currency::USD), test_now())
            .unwrap();

        deposit.fund_breakdown().verify(total).unwrap();
        assert_eq!(deposit.remaining_in_escrow().amount(), dec!(200.00));
    }
}
