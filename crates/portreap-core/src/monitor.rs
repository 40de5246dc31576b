//! The monitor: one tracking table, one provider, one actuator.
//!
//! The table sits behind a single mutex. A cycle holds it for all of its
//! table access (including the kills it issues); status queries from other
//! threads wait for the cycle to finish. There is one writer, and readers
//! take turns with it.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use portreap_common::config::MonitorConfig;
use portreap_common::error::{PortreapError, Result};

use crate::actuator::{DryRunActuator, SsKillActuator, TerminationActuator};
use crate::reconciler::{AgingPolicy, CycleReport, Reconciler};
use crate::snapshot::{self, provider::SnapshotProvider, provider::SsSnapshotProvider};
use crate::table::{TrackedEntry, TrackingTable};

/// Drives reconciliation cycles for one port.
pub struct Monitor {
    table: Mutex<TrackingTable>,
    reconciler: Reconciler,
    provider: Box<dyn SnapshotProvider>,
    actuator: Box<dyn TerminationActuator>,
}

impl Monitor {
    /// Creates a monitor backed by `ss` for the configured port.
    ///
    /// In dry-run mode kills are logged instead of executed.
    #[must_use]
    pub fn new(config: &MonitorConfig) -> Self {
        let actuator: Box<dyn TerminationActuator> = if config.dry_run {
            Box::new(DryRunActuator)
        } else {
            Box::new(SsKillActuator)
        };
        Self::with_parts(
            AgingPolicy::from_config(config),
            Box::new(SsSnapshotProvider::new(config.port)),
            actuator,
        )
    }

    /// Creates a monitor from explicit parts.
    #[must_use]
    pub fn with_parts(
        policy: AgingPolicy,
        provider: Box<dyn SnapshotProvider>,
        actuator: Box<dyn TerminationActuator>,
    ) -> Self {
        Self {
            table: Mutex::new(TrackingTable::new()),
            reconciler: Reconciler::new(policy),
            provider,
            actuator,
        }
    }

    /// Runs one cycle evaluated at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be obtained; the table is
    /// left untouched in that case.
    pub fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        let records = snapshot::observe(self.provider.as_ref())?;
        let mut table = self.lock_table()?;
        Ok(self
            .reconciler
            .reconcile(&mut table, &records, now, self.actuator.as_ref()))
    }

    /// Returns a copy of every tracked entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn tracked(&self) -> Result<Vec<TrackedEntry>> {
        Ok(self.lock_table()?.iterate_snapshot())
    }

    /// Locks the tracking table, mapping a poisoned lock to a domain error.
    fn lock_table(&self) -> Result<MutexGuard<'_, TrackingTable>> {
        self.table.lock().map_err(|_| PortreapError::Config {
            message: "tracking table lock poisoned".into(),
        })
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("reconciler", &self.reconciler)
            .finish_non_exhaustive()
    }
}
