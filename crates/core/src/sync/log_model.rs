//! Sync ledger domain models: attempt log entries and status reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{EntityKind, SyncAction};

/// Outcome of a single sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOutcome {
    #[default]
    Synced,
    Failed,
}

/// One immutable record per orchestrator invocation.
///
/// Entries are append-only audit data; nothing in the sync control flow ever
/// reads them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntry {
    pub id: String,
    pub entity_kind: EntityKind,
    pub entity_id: i64,
    pub action: SyncAction,
    pub status: SyncOutcome,
    pub secondary_id: Option<String>,
    pub error_message: Option<String>,
    /// Human-readable identity of whoever triggered the mutation, if known.
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SyncLogEntry {
    /// Entry for a successful attempt.
    pub fn synced(
        entity_kind: EntityKind,
        entity_id: i64,
        action: SyncAction,
        secondary_id: Option<String>,
        actor: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_kind,
            entity_id,
            action,
            status: SyncOutcome::Synced,
            secondary_id,
            error_message: None,
            actor,
            created_at: Utc::now(),
        }
    }

    /// Entry for a failed attempt.
    pub fn failed(
        entity_kind: EntityKind,
        entity_id: i64,
        action: SyncAction,
        error_message: String,
        actor: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_kind,
            entity_id,
            action,
            status: SyncOutcome::Failed,
            secondary_id: None,
            error_message: Some(error_message),
            actor,
            created_at: Utc::now(),
        }
    }
}

/// Per-kind sync coverage, as shown on the admin status surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSyncStatus {
    pub entity_kind: EntityKind,
    pub total: i64,
    pub synced: i64,
    pub failed_or_pending: i64,
    pub percentage: u8,
}

impl KindSyncStatus {
    /// Derives a report from row counts.
    ///
    /// `synced` counts rows holding a secondary key; the remainder is failed
    /// or pending. An empty table reports 100%.
    pub fn from_counts(entity_kind: EntityKind, total: i64, synced: i64) -> Self {
        let synced = synced.min(total);
        let percentage = if total == 0 {
            100
        } else {
            ((synced * 100 + total / 2) / total) as u8
        };
        Self {
            entity_kind,
            total,
            synced,
            failed_or_pending: total - synced,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_always_partition_total() {
        for (total, synced) in [(0, 0), (10, 0), (10, 3), (10, 10), (3, 7)] {
            let status = KindSyncStatus::from_counts(EntityKind::Bundles, total, synced);
            assert_eq!(status.synced + status.failed_or_pending, status.total);
        }
    }

    #[test]
    fn test_percentage_rounds() {
        let status = KindSyncStatus::from_counts(EntityKind::PortfolioItems, 3, 2);
        assert_eq!(status.percentage, 67);
        let empty = KindSyncStatus::from_counts(EntityKind::PortfolioItems, 0, 0);
        assert_eq!(empty.percentage, 100);
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&SyncOutcome::Synced).unwrap(),
            "\"SYNCED\""
        );
        assert_eq!(
            serde_json::to_string(&SyncOutcome::Failed).unwrap(),
            "\"FAILED\""
        );
    }

    #[test]
    fn test_failed_entry_records_message() {
        let entry = SyncLogEntry::failed(
            EntityKind::GalleryImages,
            4,
            SyncAction::Update,
            "connection refused".to_string(),
            Some("admin@lumen.example".to_string()),
        );
        assert_eq!(entry.status, SyncOutcome::Failed);
        assert_eq!(entry.error_message.as_deref(), Some("connection refused"));
        assert!(entry.secondary_id.is_none());
        assert!(!entry.id.is_empty());
    }
}
