//! In-memory presence map with event fan-out
//!
//! The map is shared across all open channels and keyed by principal id:
//! a reconnect overwrites the existing entry instead of duplicating it,
//! and near-simultaneous events for the same principal resolve to the last
//! writer. Entries are never persisted; a process restart starts empty.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::presence::{PresenceEntry, PresenceEvent, PresenceStatus};

/// Capacity of the event fan-out channel. Slow subscribers observe a lag
/// error and resubscribe rather than blocking publishers.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Tracks which principals are currently online and broadcasts every
/// status transition.
pub struct PresenceTracker {
    entries: DashMap<Uuid, PresenceEntry>,
    events: broadcast::Sender<PresenceEvent>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: DashMap::new(),
            events,
        }
    }

    /// Records a channel open for an authenticated principal
    pub fn connect(&self, principal_id: Uuid) -> PresenceEvent {
        self.transition(principal_id, PresenceStatus::Online)
    }

    /// Records a channel close, graceful or abrupt
    pub fn disconnect(&self, principal_id: Uuid) -> PresenceEvent {
        self.transition(principal_id, PresenceStatus::Offline)
    }

    fn transition(&self, principal_id: Uuid, status: PresenceStatus) -> PresenceEvent {
        let entry = PresenceEntry {
            principal_id,
            status,
            last_seen: Utc::now(),
        };
        // The whole entry is written in one insert; last writer wins.
        self.entries.insert(principal_id, entry.clone());

        let event = PresenceEvent::from_entry(&entry);
        debug!(%principal_id, ?status, "presence transition");
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.events.send(event.clone());
        event
    }

    /// Subscribes to status transitions
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.events.subscribe()
    }

    /// Current entry for a principal, if any transition was recorded
    pub fn get(&self, principal_id: Uuid) -> Option<PresenceEntry> {
        self.entries.get(&principal_id).map(|e| e.clone())
    }

    /// Snapshot of all recorded entries
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        self.entries.iter().map(|e| e.clone()).collect()
    }

    /// Number of principals currently online
    pub fn online_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == PresenceStatus::Online)
            .count()
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a principal online for its lifetime and offline on drop.
///
/// Dropping the guard is how an abrupt channel teardown (no graceful close
/// message) still produces an offline transition.
pub struct PresenceGuard {
    tracker: Arc<PresenceTracker>,
    principal_id: Uuid,
}

impl PresenceGuard {
    pub fn connect(tracker: Arc<PresenceTracker>, principal_id: Uuid) -> Self {
        tracker.connect(principal_id);
        Self {
            tracker,
            principal_id,
        }
    }

    pub fn principal_id(&self) -> Uuid {
        self.principal_id
    }
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        self.tracker.disconnect(self.principal_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_then_disconnect_resolves_offline() {
        let tracker = PresenceTracker::new();
        let principal_id = Uuid::new_v4();

        tracker.connect(principal_id);
        tracker.disconnect(principal_id);

        let entry = tracker.get(principal_id).unwrap();
        assert_eq!(entry.status, PresenceStatus::Offline);
    }

    #[test]
    fn test_reconnect_does_not_duplicate_entries() {
        let tracker = PresenceTracker::new();
        let principal_id = Uuid::new_v4();

        tracker.connect(principal_id);
        tracker.connect(principal_id);

        assert_eq!(tracker.snapshot().len(), 1);
        assert_eq!(tracker.online_count(), 1);
    }

    #[tokio::test]
    async fn test_transitions_are_broadcast() {
        let tracker = PresenceTracker::new();
        let principal_id = Uuid::new_v4();
        let mut rx = tracker.subscribe();

        tracker.connect(principal_id);
        tracker.disconnect(principal_id);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.principal_id, principal_id);
        assert_eq!(first.status, PresenceStatus::Online);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.status, PresenceStatus::Offline);
    }

    #[test]
    fn test_guard_marks_offline_on_drop() {
        let tracker = Arc::new(PresenceTracker::new());
        let principal_id = Uuid::new_v4();

        {
            let _guard = PresenceGuard::connect(tracker.clone(), principal_id);
            assert_eq!(
                tracker.get(principal_id).unwrap().status,
                PresenceStatus::Online
            );
        }

        assert_eq!(
            tracker.get(principal_id).unwrap().status,
            PresenceStatus::Offline
        );
    }

    #[tokio::test]
    async fn test_concurrent_events_for_same_principal_settle() {
        let tracker = Arc::new(PresenceTracker::new());
        let principal_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                tracker.connect(principal_id);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        tracker.disconnect(principal_id);

        let entry = tracker.get(principal_id).unwrap();
        assert_eq!(entry.status, PresenceStatus::Offline);
        assert_eq!(tracker.snapshot().len(), 1);
    }
}
