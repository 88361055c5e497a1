//! Versioned in-memory store
//!
//! Persistence engine choice is out of scope; this store keeps the logical
//! record layout (one record per agreement, deposit, and claim, each with a
//! version counter) behind the optimistic-concurrency discipline every
//! mutating operation follows: load a snapshot, compute the next state,
//! commit only if the stored version still matches. On mismatch the commit
//! fails with `ConcurrentModification` and the caller retries against fresh
//! state.
//!
//! Multi-record commits (activation, claim submission, settlement) happen
//! under a single lock acquisition, so an agreement never reaches `active`
//! without its deposit and a settlement never half-applies.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use core_kernel::{AgreementId, ClaimId, DepositId};
use domain_agreement::TenancyAgreement;
use domain_claims::DepositClaim;
use domain_escrow::Deposit;

/// Errors surfaced by the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist
    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    /// Another writer committed since this snapshot was loaded
    ///
    /// Caller-retryable: re-fetch the record and reapply the operation.
    #[error("Concurrent modification on {entity} {id}: expected version {expected}, found {actual}")]
    ConcurrentModification {
        entity: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// A record with this identity already exists
    #[error("Already exists: {entity} {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

impl StoreError {
    /// Returns true if the caller may retry against fresh state
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::ConcurrentModification { .. })
    }
}

#[derive(Default)]
struct Tables {
    agreements: HashMap<AgreementId, TenancyAgreement>,
    deposits: HashMap<DepositId, Deposit>,
    claims: HashMap<ClaimId, DepositClaim>,
}

impl Tables {
    fn check_agreement_version(&self, agreement: &TenancyAgreement) -> Result<(), StoreError> {
        let stored = self
            .agreements
            .get(&agreement.id())
            .ok_or_else(|| StoreError::NotFound {
                entity: "agreement",
                id: agreement.id().to_string(),
            })?;
        if stored.version() != agreement.version() {
            return Err(StoreError::ConcurrentModification {
                entity: "agreement",
                id: agreement.id().to_string(),
                expected: agreement.version(),
                actual: stored.version(),
            });
        }
        Ok(())
    }

    fn check_deposit_version(&self, deposit: &Deposit) -> Result<(), StoreError> {
        let stored = self
            .deposits
            .get(&deposit.id())
            .ok_or_else(|| StoreError::NotFound {
                entity: "deposit",
                id: deposit.id().to_string(),
            })?;
        if stored.version() != deposit.version() {
            return Err(StoreError::ConcurrentModification {
                entity: "deposit",
                id: deposit.id().to_string(),
                expected: deposit.version(),
                actual: stored.version(),
            });
        }
        Ok(())
    }

    fn check_claim_version(&self, claim: &DepositClaim) -> Result<(), StoreError> {
        let stored = self
            .claims
            .get(&claim.id())
            .ok_or_else(|| StoreError::NotFound {
                entity: "claim",
                id: claim.id().to_string(),
            })?;
        if stored.version() != claim.version() {
            return Err(StoreError::ConcurrentModification {
                entity: "claim",
                id: claim.id().to_string(),
                expected: claim.version(),
                actual: stored.version(),
            });
        }
        Ok(())
    }

    fn store_agreement(&mut self, agreement: &mut TenancyAgreement) {
        agreement.advance_version();
        let mut snapshot = agreement.clone();
        // pending events stay with the caller for dispatch
        snapshot.take_events();
        self.agreements.insert(snapshot.id(), snapshot);
    }

    fn store_deposit(&mut self, deposit: &mut Deposit) {
        deposit.advance_version();
        let mut snapshot = deposit.clone();
        snapshot.take_events();
        self.deposits.insert(snapshot.id(), snapshot);
    }

    fn store_claim(&mut self, claim: &mut DepositClaim) {
        claim.advance_version();
        let mut snapshot = claim.clone();
        snapshot.take_events();
        self.claims.insert(snapshot.id(), snapshot);
    }
}

/// In-memory record store for agreements, deposits, and claims
#[derive(Default)]
pub struct CoreStore {
    inner: RwLock<Tables>,
}

impl CoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a newly created agreement
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the identity is taken
    pub fn insert_agreement(&self, agreement: &mut TenancyAgreement) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        if tables.agreements.contains_key(&agreement.id()) {
            return Err(StoreError::AlreadyExists {
                entity: "agreement",
                id: agreement.id().to_string(),
            });
        }
        let mut snapshot = agreement.clone();
        snapshot.take_events();
        tables.agreements.insert(snapshot.id(), snapshot);
        Ok(())
    }

    /// Loads a snapshot of an agreement
    pub fn load_agreement(&self, id: AgreementId) -> Result<TenancyAgreement, StoreError> {
        let tables = self.inner.read().expect("store lock poisoned");
        tables
            .agreements
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "agreement",
                id: id.to_string(),
            })
    }

    /// Commits a mutated agreement snapshot
    ///
    /// Compare-and-swap on the version loaded with the snapshot; the
    /// caller's copy is version-bumped on success and keeps its pending
    /// events for dispatch.
    pub fn commit_agreement(&self, agreement: &mut TenancyAgreement) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        tables.check_agreement_version(agreement)?;
        tables.store_agreement(agreement);
        Ok(())
    }

    /// Commits an activation: agreement transition plus deposit creation
    ///
    /// Both records change under one lock acquisition.
    pub fn commit_activation(
        &self,
        agreement: &mut TenancyAgreement,
        deposit: &mut Deposit,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        tables.check_agreement_version(agreement)?;
        if tables.deposits.contains_key(&deposit.id()) {
            return Err(StoreError::AlreadyExists {
                entity: "deposit",
                id: deposit.id().to_string(),
            });
        }
        tables.store_agreement(agreement);
        let mut snapshot = deposit.clone();
        snapshot.take_events();
        tables.deposits.insert(snapshot.id(), snapshot);
        Ok(())
    }

    /// Loads a snapshot of a deposit
    pub fn load_deposit(&self, id: DepositId) -> Result<Deposit, StoreError> {
        let tables = self.inner.read().expect("store lock poisoned");
        tables
            .deposits
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "deposit",
                id: id.to_string(),
            })
    }

    /// Commits a mutated deposit snapshot
    pub fn commit_deposit(&self, deposit: &mut Deposit) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        tables.check_deposit_version(deposit)?;
        tables.store_deposit(deposit);
        Ok(())
    }

    /// Commits a claim submission: new claim plus deposit status change
    pub fn commit_claim_submission(
        &self,
        deposit: &mut Deposit,
        claim: &mut DepositClaim,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        tables.check_deposit_version(deposit)?;
        if tables.claims.contains_key(&claim.id()) {
            return Err(StoreError::AlreadyExists {
                entity: "claim",
                id: claim.id().to_string(),
            });
        }
        tables.store_deposit(deposit);
        let mut snapshot = claim.clone();
        snapshot.take_events();
        tables.claims.insert(snapshot.id(), snapshot);
        Ok(())
    }

    /// Loads a snapshot of a claim
    pub fn load_claim(&self, id: ClaimId) -> Result<DepositClaim, StoreError> {
        let tables = self.inner.read().expect("store lock poisoned");
        tables
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "claim",
                id: id.to_string(),
            })
    }

    /// Commits a mutated claim snapshot
    pub fn commit_claim(&self, claim: &mut DepositClaim) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        tables.check_claim_version(claim)?;
        tables.store_claim(claim);
        Ok(())
    }

    /// Commits a settlement: claim transition plus the escrow movement
    pub fn commit_settlement(
        &self,
        claim: &mut DepositClaim,
        deposit: &mut Deposit,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().expect("store lock poisoned");
        tables.check_claim_version(claim)?;
        tables.check_deposit_version(deposit)?;
        tables.store_claim(claim);
        tables.store_deposit(deposit);
        Ok(())
    }

    /// IDs of agreements the expiry sweep must examine
    pub fn non_terminal_agreement_ids(&self) -> Vec<AgreementId> {
        let tables = self.inner.read().expect("store lock poisoned");
        tables
            .agreements
            .values()
            .filter(|a| !a.is_terminal())
            .map(|a| a.id())
            .collect()
    }

    /// IDs of deposits the inspection-close sweep must examine
    pub fn unreleased_deposit_ids(&self) -> Vec<DepositId> {
        let tables = self.inner.read().expect("store lock poisoned");
        tables
            .deposits
            .values()
            .filter(|d| !d.is_fully_released())
            .map(|d| d.id())
            .collect()
    }

    /// Snapshots of every claim raised against the given deposit
    pub fn claims_for_deposit(&self, deposit_id: DepositId) -> Vec<DepositClaim> {
        let tables = self.inner.read().expect("store lock poisoned");
        tables
            .claims
            .values()
            .filter(|c| c.deposit_id() == deposit_id)
            .cloned()
            .collect()
    }
}
