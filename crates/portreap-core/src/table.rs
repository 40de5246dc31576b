//! The tracking table: exclusive owner of every tracked connection.
//!
//! All mutation goes through [`TrackingTable::upsert_seen`],
//! [`TrackingTable::mark_all_inactive`] and [`TrackingTable::evict`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use portreap_common::types::{ConnectionId, EndpointPair};
use serde::{Deserialize, Serialize};

/// Persistent state of one connection across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    /// Kernel socket identifier.
    pub id: ConnectionId,
    /// Addresses as observed when the entry was created.
    pub endpoints: EndpointPair,
    /// Time of the first sighting.
    pub first_seen: DateTime<Utc>,
    /// Time of the most recent sighting. Never earlier than `first_seen`.
    pub last_seen: DateTime<Utc>,
    /// Whether the connection was in the most recent snapshot.
    pub active: bool,
}

/// Whether an upsert created a new entry or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// First sighting of the identifier.
    Inserted,
    /// Identifier was already tracked.
    Refreshed,
}

/// Map from connection identifier to tracked state.
#[derive(Debug, Default)]
pub struct TrackingTable {
    entries: BTreeMap<ConnectionId, TrackedEntry>,
}

impl TrackingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting of `id` at `now`.
    ///
    /// A new entry starts with `first_seen == last_seen == now`. An existing
    /// entry keeps its `first_seen` and endpoints. If the clock went
    /// backwards, `last_seen` is clamped to `first_seen`.
    pub fn upsert_seen(
        &mut self,
        id: &ConnectionId,
        endpoints: &EndpointPair,
        now: DateTime<Utc>,
    ) -> Upsert {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.last_seen = now.max(entry.first_seen);
            entry.active = true;
            return Upsert::Refreshed;
        }
        let _ = self.entries.insert(
            id.clone(),
            TrackedEntry {
                id: id.clone(),
                endpoints: endpoints.clone(),
                first_seen: now,
                last_seen: now,
                active: true,
            },
        );
        Upsert::Inserted
    }

    /// Clears the active flag on every entry.
    pub fn mark_all_inactive(&mut self) {
        for entry in self.entries.values_mut() {
            entry.active = false;
        }
    }

    /// Removes an entry, returning it if it was tracked.
    pub fn evict(&mut self, id: &ConnectionId) -> Option<TrackedEntry> {
        self.entries.remove(id)
    }

    /// Returns a copy of every entry, safe to hold while evicting.
    #[must_use]
    pub fn iterate_snapshot(&self) -> Vec<TrackedEntry> {
        self.entries.values().cloned().collect()
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, id: &ConnectionId) -> Option<&TrackedEntry> {
        self.entries.get(id)
    }

    /// Number of tracked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn t(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::minutes(minutes)
    }

    fn pair() -> EndpointPair {
        EndpointPair::new("10.0.0.1:50090", "10.0.0.2:41000")
    }

    #[test]
    fn upsert_inserts_new_entry() {
        let mut table = TrackingTable::new();
        let id = ConnectionId::new("1");
        assert_eq!(table.upsert_seen(&id, &pair(), t(0)), Upsert::Inserted);

        let entry = table.get(&id).expect("tracked");
        assert_eq!(entry.first_seen, t(0));
        assert_eq!(entry.last_seen, t(0));
        assert!(entry.active);
    }

    #[test]
    fn upsert_refresh_keeps_first_seen() {
        let mut table = TrackingTable::new();
        let id = ConnectionId::new("1");
        let _ = table.upsert_seen(&id, &pair(), t(0));
        table.mark_all_inactive();
        assert_eq!(table.upsert_seen(&id, &pair(), t(30)), Upsert::Refreshed);

        let entry = table.get(&id).expect("tracked");
        assert_eq!(entry.first_seen, t(0));
        assert_eq!(entry.last_seen, t(30));
        assert!(entry.active);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn upsert_clamps_backwards_clock() {
        let mut table = TrackingTable::new();
        let id = ConnectionId::new("1");
        let _ = table.upsert_seen(&id, &pair(), t(10));
        let _ = table.upsert_seen(&id, &pair(), t(5));

        let entry = table.get(&id).expect("tracked");
        assert!(entry.first_seen <= entry.last_seen);
        assert_eq!(entry.last_seen, t(10));
    }

    #[test]
    fn mark_all_inactive_leaves_timestamps() {
        let mut table = TrackingTable::new();
        let id = ConnectionId::new("1");
        let _ = table.upsert_seen(&id, &pair(), t(0));
        table.mark_all_inactive();

        let entry = table.get(&id).expect("tracked");
        assert!(!entry.active);
        assert_eq!(entry.last_seen, t(0));
    }

    #[test]
    fn evict_is_unconditional_and_one_shot() {
        let mut table = TrackingTable::new();
        let id = ConnectionId::new("1");
        let _ = table.upsert_seen(&id, &pair(), t(0));
        assert!(table.evict(&id).is_some());
        assert!(table.evict(&id).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn iterate_snapshot_survives_eviction() {
        let mut table = TrackingTable::new();
        for n in ["1", "2", "3"] {
            let _ = table.upsert_seen(&ConnectionId::new(n), &pair(), t(0));
        }
        for entry in table.iterate_snapshot() {
            let _ = table.evict(&entry.id);
        }
        assert!(table.is_empty());
    }
}
