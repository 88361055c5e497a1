//! Application Services
//!
//! This crate wires the domain aggregates together:
//! - A versioned in-memory store with optimistic concurrency: per-aggregate
//!   compare-and-swap commits, first committer wins
//! - The lifecycle service driving agreements from signature collection to
//!   activation, including the gateway-charging flows
//! - The settlement service driving claims and the escrow ledger
//! - The scheduler sweeps for stage expiry and inspection-window close

pub mod error;
pub mod lifecycle;
pub mod settlement;
pub mod store;
pub mod sweeps;

pub use error::ServiceError;
pub use lifecycle::{ExpirySweepReport, LifecycleService};
pub use settlement::{InspectionSweepReport, SettlementService};
pub use store::{CoreStore, StoreError};
pub use sweeps::{SweepScheduler, SweepSummary};
