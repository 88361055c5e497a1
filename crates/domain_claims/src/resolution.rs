//! Claim submission rules
//!
//! Submission is the one claim operation that needs a view wider than the
//! claim itself: the inspection window and every other claim on the same
//! deposit. The functions here validate that view; individual claim
//! transitions live on [`DepositClaim`].

use chrono::{DateTime, Utc};

use core_kernel::{EvidenceId, Money};
use domain_escrow::Deposit;

use crate::claim::{ClaimCategory, DepositClaim};
use crate::error::ClaimError;

/// A landlord's request to raise a deduction claim
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub amount: Money,
    pub category: ClaimCategory,
    pub title: String,
    pub description: String,
    pub evidence: Vec<EvidenceId>,
}

/// Sums the amounts the given claims keep locked in escrow
pub fn escrow_hold(claims: &[DepositClaim], zero: Money) -> Result<Money, ClaimError> {
    let mut total = zero;
    for claim in claims {
        total = total.checked_add(&claim.escrow_hold())?;
    }
    Ok(total)
}

/// Raises a new claim against the deposit
///
/// Permitted only while the inspection window is open, and only while the
/// new amount plus every open claim's hold fits in the remaining escrow
/// balance. The amount is reserved conceptually at submission; the literal
/// debit happens at settlement.
///
/// # Errors
///
/// - `InspectionWindowNotOpen` / `InspectionWindowClosed` outside the window
/// - `AmountNotPositive` for a zero or negative amount
/// - `InsufficientEscrowBalance` when the cap would be exceeded
pub fn submit_claim(
    deposit: &Deposit,
    existing: &[DepositClaim],
    request: ClaimRequest,
    now: DateTime<Utc>,
) -> Result<DepositClaim, ClaimError> {
    let window = deposit.inspection_window();
    if window.not_yet_open(now) {
        return Err(ClaimError::InspectionWindowNotOpen {
            opens_at: window.opens_at(),
        });
    }
    if window.has_closed(now) {
        return Err(ClaimError::InspectionWindowClosed {
            closed_at: window.closes_at(),
        });
    }

    if !request.amount.is_positive() {
        return Err(ClaimError::AmountNotPositive {
            amount: request.amount,
        });
    }

    let zero = Money::zero(deposit.total_amount().currency());
    let held = escrow_hold(existing, zero)?;
    let available = deposit.remaining_in_escrow().checked_sub(&held)?;
    if request.amount.amount() > available.amount() {
        return Err(ClaimError::InsufficientEscrowBalance {
            requested: request.amount,
            available,
        });
    }

    Ok(DepositClaim::submitted(
        deposit.id(),
        request.amount,
        request.category,
        request.title,
        request.description,
        request.evidence,
        now,
    ))
}
