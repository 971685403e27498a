//! Presence entities: ephemeral online/offline state keyed by principal.
//!
//! Presence is held only in memory and is lost on process restart by design.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection status of a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Current presence state of one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    /// Principal this entry belongs to
    pub principal_id: Uuid,

    /// Last recorded status
    pub status: PresenceStatus,

    /// Timestamp of the last status transition
    pub last_seen: DateTime<Utc>,
}

/// Status transition broadcast to channel subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub principal_id: Uuid,
    pub status: PresenceStatus,
    pub timestamp: DateTime<Utc>,
}

impl PresenceEvent {
    pub fn from_entry(entry: &PresenceEntry) -> Self {
        Self {
            principal_id: entry.principal_id,
            status: entry.status,
            timestamp: entry.last_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PresenceStatus::Online).unwrap(),
            "\"online\""
        );
        assert_eq!(
            serde_json::from_str::<PresenceStatus>("\"offline\"").unwrap(),
            PresenceStatus::Offline
        );
    }

    #[test]
    fn test_event_from_entry() {
        let entry = PresenceEntry {
            principal_id: Uuid::new_v4(),
            status: PresenceStatus::Online,
            last_seen: Utc::now(),
        };

        let event = PresenceEvent::from_entry(&entry);
        assert_eq!(event.principal_id, entry.principal_id);
        assert_eq!(event.status, PresenceStatus::Online);
        assert_eq!(event.timestamp, entry.last_seen);
    }
}
