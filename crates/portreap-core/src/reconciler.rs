//! Per-cycle reconciliation of a fresh snapshot against the tracking table.
//!
//! One call to [`Reconciler::reconcile`] is one cycle:
//!
//! 1. every tracked entry is marked inactive;
//! 2. each observed record refreshes its entry or creates a new one;
//! 3. every entry is evaluated against the [`AgingPolicy`]. The kill rule
//!    is checked before the inactivity rule, on the same entry state.
//!
//! A killed entry is evicted whether or not the kill succeeded.

use chrono::{DateTime, TimeDelta, Utc};
use portreap_common::config::MonitorConfig;

use crate::actuator::{TerminationActuator, terminate_entry};
use crate::snapshot::ObservedRecord;
use crate::table::{TrackedEntry, TrackingTable, Upsert};

/// Thresholds deciding when an entry is killed or forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingPolicy {
    /// Lifetime after which an active connection is killed.
    pub max_active: TimeDelta,
    /// Time since last sighting after which an entry is dropped.
    pub max_inactive: TimeDelta,
}

impl AgingPolicy {
    /// Builds the policy from the monitor configuration.
    #[must_use]
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            max_active: config.max_active(),
            max_inactive: config.max_inactive(),
        }
    }

    /// Decides the fate of one entry at `now`.
    #[must_use]
    pub fn evaluate(&self, entry: &TrackedEntry, now: DateTime<Utc>) -> Verdict {
        if entry.active && now - entry.first_seen > self.max_active {
            Verdict::Kill
        } else if now - entry.last_seen > self.max_inactive {
            Verdict::Expire
        } else {
            Verdict::Retain
        }
    }
}

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Terminate the connection, then evict.
    Kill,
    /// Evict without terminating.
    Expire,
    /// Keep unchanged.
    Retain,
}

/// Result of one termination attempt.
#[derive(Debug, Clone)]
pub struct KillOutcome {
    /// The entry as it was when the kill was issued.
    pub entry: TrackedEntry,
    /// Error description if the attempt failed.
    pub error: Option<String>,
}

impl KillOutcome {
    /// Returns `true` if the actuator reported success.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything that happened during one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Time the cycle was evaluated at.
    pub now: DateTime<Utc>,
    /// Number of records in the snapshot.
    pub observed: usize,
    /// Entries created this cycle.
    pub new: Vec<TrackedEntry>,
    /// Entries killed and evicted this cycle.
    pub killed: Vec<KillOutcome>,
    /// Entries evicted for inactivity this cycle.
    pub expired: Vec<TrackedEntry>,
    /// Table size after the cycle.
    pub tracked: usize,
}

/// Applies snapshots to a tracking table under an aging policy.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    policy: AgingPolicy,
}

impl Reconciler {
    /// Creates a reconciler with the given policy.
    #[must_use]
    pub const fn new(policy: AgingPolicy) -> Self {
        Self { policy }
    }

    /// Runs one cycle against `table`.
    ///
    /// Termination failures are recorded in the report, never propagated.
    pub fn reconcile(
        &self,
        table: &mut TrackingTable,
        records: &[ObservedRecord],
        now: DateTime<Utc>,
        actuator: &dyn TerminationActuator,
    ) -> CycleReport {
        table.mark_all_inactive();

        let mut report = CycleReport {
            now,
            observed: records.len(),
            new: Vec::new(),
            killed: Vec::new(),
            expired: Vec::new(),
            tracked: 0,
        };

        for record in records {
            if table.upsert_seen(&record.id, &record.endpoints, now) == Upsert::Inserted {
                tracing::info!(inode = %record.id, endpoints = %record.endpoints, "new connection tracked");
                if let Some(entry) = table.get(&record.id) {
                    report.new.push(entry.clone());
                }
            }
        }

        for entry in table.iterate_snapshot() {
            match self.policy.evaluate(&entry, now) {
                Verdict::Kill => {
                    tracing::info!(
                        inode = %entry.id,
                        endpoints = %entry.endpoints,
                        age_min = (now - entry.first_seen).num_minutes(),
                        "killing active connection"
                    );
                    let error = terminate_entry(actuator, &entry).err().map(|e| e.to_string());
                    let _ = table.evict(&entry.id);
                    report.killed.push(KillOutcome { entry, error });
                }
                Verdict::Expire => {
                    tracing::info!(
                        inode = %entry.id,
                        endpoints = %entry.endpoints,
                        idle_min = (now - entry.last_seen).num_minutes(),
                        "removing inactive connection"
                    );
                    let _ = table.evict(&entry.id);
                    report.expired.push(entry);
                }
                Verdict::Retain => {}
            }
        }

        report.tracked = table.len();
        tracing::debug!(tracked = report.tracked, "cycle reconciled");
        report
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use portreap_common::error::{PortreapError, Result};
    use portreap_common::types::{ConnectionId, EndpointPair};

    use super::*;

    fn t(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::minutes(minutes)
    }

    fn record(id: &str) -> ObservedRecord {
        ObservedRecord {
            id: ConnectionId::new(id),
            endpoints: EndpointPair::new("10.0.0.1:50090", format!("10.0.0.2:{id}")),
        }
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(AgingPolicy {
            max_active: TimeDelta::minutes(120),
            max_inactive: TimeDelta::minutes(60),
        })
    }

    #[derive(Default)]
    struct Counting {
        kills: Mutex<Vec<EndpointPair>>,
        fail: bool,
    }

    impl TerminationActuator for Counting {
        fn terminate(&self, endpoints: &EndpointPair) -> Result<()> {
            self.kills.lock().unwrap().push(endpoints.clone());
            if self.fail {
                return Err(PortreapError::Termination {
                    target: endpoints.to_string(),
                    message: "no such socket".into(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn evaluate_prefers_kill_over_expiry() {
        let policy = reconciler().policy;
        let entry = TrackedEntry {
            id: ConnectionId::new("1"),
            endpoints: EndpointPair::new("a:1", "b:2"),
            first_seen: t(0),
            last_seen: t(0),
            active: true,
        };
        assert_eq!(policy.evaluate(&entry, t(200)), Verdict::Kill);
    }

    #[test]
    fn evaluate_inactive_old_entry_expires_not_killed() {
        let policy = reconciler().policy;
        let entry = TrackedEntry {
            id: ConnectionId::new("1"),
            endpoints: EndpointPair::new("a:1", "b:2"),
            first_seen: t(0),
            last_seen: t(100),
            active: false,
        };
        assert_eq!(policy.evaluate(&entry, t(170)), Verdict::Expire);
    }

    #[test]
    fn evaluate_thresholds_are_strict() {
        let policy = reconciler().policy;
        let entry = TrackedEntry {
            id: ConnectionId::new("1"),
            endpoints: EndpointPair::new("a:1", "b:2"),
            first_seen: t(0),
            last_seen: t(60),
            active: true,
        };
        assert_eq!(policy.evaluate(&entry, t(120)), Verdict::Retain);
    }

    #[test]
    fn new_records_are_reported() {
        let mut table = TrackingTable::new();
        let actuator = Counting::default();
        let report = reconciler().reconcile(&mut table, &[record("1"), record("2")], t(0), &actuator);
        assert_eq!(report.new.len(), 2);
        assert_eq!(report.tracked, 2);
        assert_eq!(report.observed, 2);
    }

    #[test]
    fn refreshed_records_are_not_new() {
        let mut table = TrackingTable::new();
        let actuator = Counting::default();
        let r = reconciler();
        let _ = r.reconcile(&mut table, &[record("1")], t(0), &actuator);
        let report = r.reconcile(&mut table, &[record("1")], t(30), &actuator);
        assert!(report.new.is_empty());
        let entry = table.get(&ConnectionId::new("1")).expect("tracked");
        assert_eq!(entry.first_seen, t(0));
        assert_eq!(entry.last_seen, t(30));
    }

    #[test]
    fn absent_record_becomes_inactive() {
        let mut table = TrackingTable::new();
        let actuator = Counting::default();
        let r = reconciler();
        let _ = r.reconcile(&mut table, &[record("1")], t(0), &actuator);
        let _ = r.reconcile(&mut table, &[], t(30), &actuator);
        assert!(!table.get(&ConnectionId::new("1")).expect("tracked").active);
    }

    #[test]
    fn failed_kill_still_evicts() {
        let mut table = TrackingTable::new();
        let actuator = Counting {
            fail: true,
            ..Counting::default()
        };
        let r = reconciler();
        let _ = r.reconcile(&mut table, &[record("1")], t(0), &actuator);
        let report = r.reconcile(&mut table, &[record("1")], t(121), &actuator);

        assert_eq!(report.killed.len(), 1);
        assert!(!report.killed[0].succeeded());
        assert!(table.is_empty());
        assert_eq!(actuator.kills.lock().unwrap().len(), 1);
    }

    #[test]
    fn malformed_endpoints_count_as_failed_kill() {
        let mut table = TrackingTable::new();
        let actuator = Counting::default();
        let r = reconciler();
        let broken = ObservedRecord {
            id: ConnectionId::new("9"),
            endpoints: EndpointPair::new("10.0.0.1:50090", ""),
        };
        let _ = r.reconcile(&mut table, &[broken.clone()], t(0), &actuator);
        let report = r.reconcile(&mut table, &[broken], t(121), &actuator);

        assert_eq!(report.killed.len(), 1);
        assert!(report.killed[0].error.is_some());
        assert!(actuator.kills.lock().unwrap().is_empty());
        assert!(table.is_empty());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lifecycle_events_are_logged_at_info() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut table = TrackingTable::new();
            let actuator = Counting::default();
            let r = reconciler();
            let _ = r.reconcile(&mut table, &[record("1")], t(0), &actuator);
            let _ = r.reconcile(&mut table, &[], t(61), &actuator);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("new connection tracked"));
        assert!(output.contains("removing inactive connection"));
        assert!(!output.contains("cycle reconciled"));
    }
}
