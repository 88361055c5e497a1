//! Custom Test Assertions
//!
//! Domain-aware assertion helpers used across the scenario suites.

use domain_escrow::Deposit;

/// Asserts the deposit's fund breakdown sums exactly to its total
///
/// This is the subsystem's central correctness property; scenario tests
/// call it after every escrow mutation.
pub fn assert_breakdown_reconciles(deposit: &Deposit) {
    deposit
        .fund_breakdown()
        .verify(deposit.total_amount())
        .expect("fund breakdown must reconcile to the deposit total");
}

/// Asserts the agreement is in the expected status
pub fn assert_status(agreement: &domain_agreement::TenancyAgreement, expected: &str) {
    assert_eq!(
        agreement.status_name(),
        expected,
        "expected agreement in {expected}, found {}",
        agreement.status_name()
    );
}
