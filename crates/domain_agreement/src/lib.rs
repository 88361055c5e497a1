//! Tenancy Agreement Domain
//!
//! This crate implements the agreement lifecycle from signature collection
//! through payment and activation.
//!
//! # Agreement Lifecycle
//!
//! ```text
//! pending_signatures -> pending_payment -> website_fee_paid -> active
//! ```
//!
//! with side branches `withdrawn`, `expired`, and `cancelled` reachable from
//! any non-terminal state before `active`.

pub mod agreement;
pub mod error;
pub mod events;

pub use agreement::{
    agreement_fee_rate, deposit_rent_multiple, AgreementBuilder, AgreementState,
    TenancyAgreement, DEPOSIT_PAYMENT_WINDOW_HOURS, FEE_PAYMENT_WINDOW_HOURS,
    SIGNATURE_WINDOW_HOURS,
};
pub use error::AgreementError;
pub use events::AgreementEvent;
