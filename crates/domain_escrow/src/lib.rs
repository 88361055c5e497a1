//! Deposit Escrow Domain
//!
//! This crate owns the `Deposit` record created when an agreement activates.
//! It tracks the total held and the running split between "released to
//! landlord", "refunded to tenant", and "remaining in escrow".
//!
//! # Central invariant
//!
//! ```text
//! released_to_landlord + refunded_to_tenant + remaining_in_escrow == total_amount
//! ```
//!
//! at every observable point. The breakdown fields are mutated exclusively
//! through the ledger entry points in this crate; other components never
//! write them directly.

pub mod deposit;
pub mod error;
pub mod events;

pub use deposit::{Deposit, DepositStatus, FundBreakdown};
pub use error::EscrowError;
pub use events::EscrowEvent;
