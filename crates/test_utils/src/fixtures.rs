//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the rental core.
//! Fixtures are consistent and predictable so scenario tests read clearly.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, DateRange, Money};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The reference monthly rent used across scenarios
    pub fn rent_2000() -> Money {
        Money::new(dec!(2000.00), Currency::USD)
    }

    /// The deposit that rent produces (2.5 months)
    pub fn deposit_5000() -> Money {
        Money::new(dec!(5000.00), Currency::USD)
    }

    /// A typical damage claim amount
    pub fn claim_300() -> Money {
        Money::new(dec!(300.00), Currency::USD)
    }

    /// A typical counter-offer amount
    pub fn counter_150() -> Money {
        Money::new(dec!(150.00), Currency::USD)
    }

    /// Zero in the reference currency
    pub fn zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed "now" well inside the lease term
    pub fn mid_lease() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap()
    }

    /// A fixed instant before the lease starts
    pub fn before_lease() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    /// The reference lease: July 2025 through June 2026
    pub fn lease_term() -> DateRange {
        DateRange::new(Self::lease_start(), Self::lease_end()).unwrap()
    }

    /// First day of the reference lease
    pub fn lease_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    /// Last day of the reference lease
    pub fn lease_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }
}
