//! Broadcast event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{EntityKind, SyncAction};

/// What a change event carries to subscribers.
///
/// Upserts ship the synced document (domain fields plus the secondary key);
/// deletes ship only a marker, since the row is gone from both stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangePayload {
    /// The record as written to the secondary store.
    Upserted { fields: Map<String, Value> },

    /// The record was removed from the secondary store.
    Deleted {
        entity_id: i64,
        secondary_id: String,
    },
}

/// A change notification published on the shared updates namespace.
///
/// Events are transient: each one self-expires 24 hours after publication,
/// and late subscribers only ever see the most recent event per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastEvent {
    /// Millisecond-derived id, strictly increasing per channel.
    pub id: i64,
    pub entity_kind: EntityKind,
    pub action: SyncAction,
    pub payload: ChangePayload,
    pub published_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BroadcastEvent {
    /// Whether this event has outlived its retention window.
    ///
    /// Subscribers filter on this even when the scheduled removal has not
    /// fired; recency, not removal, is the correctness mechanism.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_is_inclusive_of_deadline() {
        let now = Utc::now();
        let event = BroadcastEvent {
            id: 1,
            entity_kind: EntityKind::Bundles,
            action: SyncAction::Create,
            payload: ChangePayload::Upserted { fields: Map::new() },
            published_at: now,
            expires_at: now + Duration::hours(24),
        };
        assert!(!event.is_expired(now));
        assert!(!event.is_expired(now + Duration::hours(23)));
        assert!(event.is_expired(now + Duration::hours(24)));
    }

    #[test]
    fn test_payload_serialization_is_tagged() {
        let payload = ChangePayload::Deleted {
            entity_id: 9,
            secondary_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["entity_id"], 9);
    }
}
