//! Scheduler-driven sweeps
//!
//! The scheduler is the only component that acts without caller input: on
//! every tick it expires overdue agreements and releases undisputed
//! deposit remainders for closed inspection windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::lifecycle::{ExpirySweepReport, LifecycleService};
use crate::settlement::{InspectionSweepReport, SettlementService};

/// Combined outcome of one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub expiry: ExpirySweepReport,
    pub inspection: InspectionSweepReport,
}

/// Periodic runner for both sweeps
pub struct SweepScheduler {
    lifecycle: Arc<LifecycleService>,
    settlement: Arc<SettlementService>,
    period: Duration,
}

impl SweepScheduler {
    pub fn new(
        lifecycle: Arc<LifecycleService>,
        settlement: Arc<SettlementService>,
        period: Duration,
    ) -> Self {
        Self {
            lifecycle,
            settlement,
            period,
        }
    }

    /// Runs both sweeps once
    pub fn run_once(&self) -> SweepSummary {
        let expiry = self.lifecycle.run_expiry_sweep();
        let inspection = self.settlement.run_inspection_close_sweep();

        if expiry.expired > 0 || inspection.released > 0 {
            info!(
                expired = expiry.expired,
                released = inspection.released,
                conflicts = expiry.conflicts + inspection.conflicts,
                "sweep tick complete"
            );
        }

        SweepSummary { expiry, inspection }
    }

    /// Spawns the periodic tick loop
    ///
    /// Ticks missed while a sweep runs long are skipped, not bursted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                self.run_once();
            }
        })
    }
}
