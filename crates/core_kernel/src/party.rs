//! Party identity for core operations
//!
//! The core never relies on ambient auth context: every operation takes the
//! acting party explicitly. A tenancy involves exactly two roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a party plays in a tenancy agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Landlord,
    Tenant,
}

impl PartyRole {
    /// Returns the other side of the agreement
    pub fn counterparty(&self) -> PartyRole {
        match self {
            PartyRole::Landlord => PartyRole::Tenant,
            PartyRole::Tenant => PartyRole::Landlord,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PartyRole::Landlord => "landlord",
            PartyRole::Tenant => "tenant",
        }
    }
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
