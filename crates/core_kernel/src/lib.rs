//! Core Kernel - Foundational types and utilities for the rental platform
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types: clock abstraction, stage countdowns, and the inspection window
//! - Strongly-typed identifiers and party identity
//! - Ports the core consumes from its collaborators (payment gateway, notifications)

pub mod error;
pub mod identifiers;
pub mod money;
pub mod party;
pub mod ports;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{
    AgreementId, ClaimId, DepositId, EvidenceId, PartyId, PaymentId, PropertyId,
};
pub use money::{Currency, Money, MoneyError, Rate};
pub use party::PartyRole;
pub use ports::{
    GatewayError, NotificationDispatcher, NotificationError, NotificationEvent, NullDispatcher,
    PaymentGateway, PaymentOutcome,
};
pub use temporal::{Clock, Countdown, DateRange, InspectionWindow, SystemClock, Timezone};
