//! Contracts between the orchestrator and its collaborators.
//!
//! These traits define the sync subsystem's seams without any
//! database- or transport-specific types: the ledger and snapshot provider
//! are implemented by the storage crate, the adapter by the realtime crate.

use async_trait::async_trait;

use crate::content::{EntityKind, EntitySnapshot};
use crate::errors::Result;
use crate::sync::errors::AdapterError;
use crate::sync::log_model::{KindSyncStatus, SyncLogEntry};

/// Persistence contract for sync metadata.
///
/// Covers both halves of the ledger: the per-row write-back columns
/// (`secondary_id`, `last_synced_at`) and the append-only attempt log.
#[async_trait]
pub trait SyncLedgerTrait: Send + Sync {
    /// Appends one attempt record. Never updated or deleted afterwards.
    async fn append_log(&self, entry: SyncLogEntry) -> Result<()>;

    /// Writes the secondary key and sync timestamp back onto the entity row.
    ///
    /// Targeted by entity id only; concurrent writes to other columns of the
    /// same row are not serialized against this.
    async fn mark_synced(
        &self,
        kind: EntityKind,
        entity_id: i64,
        secondary_id: &str,
    ) -> Result<()>;

    /// Sync coverage for one kind, computed from row counts.
    fn status_for(&self, kind: EntityKind) -> Result<KindSyncStatus>;

    /// Most recent log entries, newest first.
    fn recent_logs(&self, limit: i64) -> Result<Vec<SyncLogEntry>>;
}

/// Read-side contract used by force-resync to load current row images.
pub trait SnapshotProviderTrait: Send + Sync {
    /// Snapshot of a single row, or `None` if it no longer exists.
    fn get_snapshot(&self, kind: EntityKind, id: i64) -> Result<Option<EntitySnapshot>>;

    /// Snapshots of every active row of a kind.
    fn list_snapshots(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>>;
}

/// Write contract against the secondary realtime store.
#[async_trait]
pub trait SecondaryStoreAdapter: Send + Sync {
    /// Writes the snapshot to the secondary store and returns its key.
    ///
    /// With no prior `secondary_id` a fresh key is allocated and the full
    /// document written; with one, the document is partially merged (fields
    /// present in the snapshot overwrite, others are untouched).
    async fn upsert(
        &self,
        kind: EntityKind,
        snapshot: &EntitySnapshot,
    ) -> std::result::Result<String, AdapterError>;

    /// Deletes the record by key. A missing key counts as success.
    async fn remove(
        &self,
        kind: EntityKind,
        secondary_id: &str,
    ) -> std::result::Result<(), AdapterError>;
}
