//! Test Data Builders
//!
//! Helpers that construct domain aggregates with sensible defaults so
//! tests specify only the fields they care about.

use chrono::{DateTime, Utc};
use core_kernel::{EvidenceId, Money, PartyId, PropertyId, Timezone};
use domain_agreement::{AgreementBuilder, TenancyAgreement};
use domain_claims::{ClaimCategory, ClaimRequest};
use domain_escrow::Deposit;

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builds an agreement in `pending_signatures` with fixture defaults
pub struct TestAgreement {
    rent: Money,
    created_at: DateTime<Utc>,
    timezone: Timezone,
}

impl Default for TestAgreement {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAgreement {
    pub fn new() -> Self {
        Self {
            rent: MoneyFixtures::rent_2000(),
            created_at: TemporalFixtures::before_lease(),
            timezone: Timezone::default(),
        }
    }

    /// Overrides the monthly rent
    pub fn with_rent(mut self, rent: Money) -> Self {
        self.rent = rent;
        self
    }

    /// Overrides the creation instant
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Overrides the property timezone
    pub fn with_timezone(mut self, tz: Timezone) -> Self {
        self.timezone = tz;
        self
    }

    pub fn build(self) -> TenancyAgreement {
        AgreementBuilder::new()
            .property(PropertyId::new())
            .landlord(PartyId::new())
            .tenant(PartyId::new())
            .monthly_rent(self.rent)
            .lease_term(TemporalFixtures::lease_term())
            .timezone(self.timezone)
            .created_at(self.created_at)
            .build()
            .expect("fixture agreement must build")
    }
}

/// Opens a deposit directly, bypassing the lifecycle, for escrow tests
pub fn open_test_deposit(agreement: &TenancyAgreement, now: DateTime<Utc>) -> Deposit {
    Deposit::open(
        agreement.id(),
        agreement.security_deposit(),
        agreement.lease_term().end,
        agreement.timezone(),
        now,
    )
    .expect("fixture deposit must open")
}

/// A claim request with fixture defaults
pub fn claim_request(amount: Money, title: &str) -> ClaimRequest {
    ClaimRequest {
        amount,
        category: ClaimCategory::Damage,
        title: title.to_string(),
        description: format!("{} recorded during the move-out inspection", title),
        evidence: vec![EvidenceId::new()],
    }
}
