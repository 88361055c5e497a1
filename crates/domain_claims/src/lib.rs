//! Claim Resolution Domain
//!
//! This crate implements the deposit-claim lifecycle raised by the landlord
//! during the post-tenancy inspection window, through tenant responses,
//! landlord counter-responses, and settlement.
//!
//! # Claim Lifecycle
//!
//! ```text
//! submitted -> tenant_notified -> accepted
//!                              -> disputed -> accepted (counter)
//!                                          -> escalated -> accepted (mediation)
//! ```

pub mod claim;
pub mod error;
pub mod events;
pub mod resolution;
pub mod visibility;

pub use claim::{
    ClaimCategory, ClaimStatus, DepositClaim, DisputeDecisionRecord, LandlordDecision,
    SettlementRoute, TenantResponse, TenantResponseRecord,
};
pub use error::ClaimError;
pub use events::ClaimEvent;
pub use resolution::{escrow_hold, submit_claim, ClaimRequest};
pub use visibility::{tenant_can_view, tenant_visible_claims};
