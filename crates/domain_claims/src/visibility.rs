//! Tenant-facing visibility rules
//!
//! Not a state but a read-time policy: claim line items are hidden from
//! tenant-facing reads until the claim has been formally surfaced to the
//! tenant or the inspection window has closed. The predicates here are the
//! single source of truth the UI renders.

use chrono::{DateTime, Utc};

use core_kernel::InspectionWindow;

use crate::claim::{ClaimStatus, DepositClaim};

/// Whether the tenant may see this claim's details right now
pub fn tenant_can_view(
    claim: &DepositClaim,
    window: &InspectionWindow,
    now: DateTime<Utc>,
) -> bool {
    if window.has_closed(now) {
        return true;
    }
    !matches!(claim.status(), ClaimStatus::Submitted)
}

/// Filters a deposit's claims down to those the tenant may see
pub fn tenant_visible_claims<'a>(
    claims: &'a [DepositClaim],
    window: &InspectionWindow,
    now: DateTime<Utc>,
) -> Vec<&'a DepositClaim> {
    claims
        .iter()
        .filter(|claim| tenant_can_view(claim, window, now))
        .collect()
}
