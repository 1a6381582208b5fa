//! The sync orchestrator: one invocation per primary-store mutation.

use std::sync::Arc;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::broadcast::{ChangePayload, UpdatesChannel};
use crate::content::{EntityKind, EntitySnapshot, SyncAction};
use crate::sync::errors::SyncError;
use crate::sync::log_model::SyncLogEntry;
use crate::sync::traits::{SecondaryStoreAdapter, SyncLedgerTrait};

/// A validated request to propagate one mutation to the secondary store.
///
/// For create/update the snapshot is the full post-write row; for delete it
/// is the minimal marker (id plus any known secondary key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub kind: EntityKind,
    pub action: SyncAction,
    pub snapshot: EntitySnapshot,
    pub actor: Option<String>,
}

impl SyncRequest {
    pub fn new(
        kind: EntityKind,
        action: SyncAction,
        snapshot: EntitySnapshot,
        actor: Option<String>,
    ) -> Self {
        Self {
            kind,
            action,
            snapshot,
            actor,
        }
    }

    /// Validates the request shape once, at the orchestrator boundary.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.snapshot.id <= 0 {
            return Err(SyncError::InvalidRequest(format!(
                "snapshot is missing a primary-store id (got {})",
                self.snapshot.id
            )));
        }
        match self.action {
            SyncAction::Create | SyncAction::Update => {
                if self.snapshot.fields.is_empty() {
                    return Err(SyncError::InvalidRequest(
                        "upsert snapshot carries no fields".to_string(),
                    ));
                }
            }
            // Deletes only need the identifiers.
            SyncAction::Delete => {}
        }
        Ok(())
    }
}

/// Sequences a sync attempt: adapter write, ledger write-back, broadcast.
///
/// Explicitly constructed with injected collaborators and shared behind an
/// `Arc`; opened once at startup, dropped on shutdown. The primary store's
/// mutation handlers never call this directly — they go through the
/// [`SyncDispatcher`](crate::sync::SyncDispatcher) so the HTTP response is
/// never held up by (or failed by) secondary-store trouble.
///
/// Failure policy: adapter errors are recorded as a failed log entry and
/// returned; the caller already committed the primary write, so nothing here
/// rolls back. A failed row self-heals on its next update (an upsert with no
/// secondary key acts as a create) or via admin force-resync.
pub struct SyncOrchestrator {
    adapter: Arc<dyn SecondaryStoreAdapter>,
    ledger: Arc<dyn SyncLedgerTrait>,
    updates: UpdatesChannel,
}

impl SyncOrchestrator {
    pub fn new(
        adapter: Arc<dyn SecondaryStoreAdapter>,
        ledger: Arc<dyn SyncLedgerTrait>,
        updates: UpdatesChannel,
    ) -> Self {
        Self {
            adapter,
            ledger,
            updates,
        }
    }

    /// Propagates one mutation. Returns the secondary key for upserts,
    /// `None` for deletes.
    ///
    /// Exactly one sync log entry is appended per invocation, whatever the
    /// outcome. A broadcast event is published only after the adapter
    /// succeeded — subscribers must never hear about state that was not
    /// durably propagated.
    pub async fn sync_entity(&self, request: SyncRequest) -> Result<Option<String>, SyncError> {
        request.validate()?;
        debug!(
            "syncing {} {} ({})",
            request.kind, request.snapshot.id, request.action
        );

        match request.action {
            SyncAction::Create | SyncAction::Update => {
                self.sync_upsert(request).await.map(Some)
            }
            SyncAction::Delete => self.sync_delete(request).await.map(|_| None),
        }
    }

    async fn sync_upsert(&self, request: SyncRequest) -> Result<String, SyncError> {
        let SyncRequest {
            kind,
            action,
            snapshot,
            actor,
        } = request;

        match self.adapter.upsert(kind, &snapshot).await {
            Ok(secondary_id) => {
                // Write-back failures leave the row looking unsynced; the
                // next upsert allocates a fresh document, which is the
                // accepted retry path for this cross-store race.
                if let Err(err) = self
                    .ledger
                    .mark_synced(kind, snapshot.id, &secondary_id)
                    .await
                {
                    error!(
                        "failed to record secondary key for {} {}: {}",
                        kind, snapshot.id, err
                    );
                }
                self.append_log(SyncLogEntry::synced(
                    kind,
                    snapshot.id,
                    action,
                    Some(secondary_id.clone()),
                    actor,
                ))
                .await;
                self.updates
                    .publish_upserted(kind, action, snapshot.document(&secondary_id));
                Ok(secondary_id)
            }
            Err(err) => {
                warn!("upsert of {} {} failed: {}", kind, snapshot.id, err);
                self.append_log(SyncLogEntry::failed(
                    kind,
                    snapshot.id,
                    action,
                    err.to_string(),
                    actor,
                ))
                .await;
                Err(err.into())
            }
        }
    }

    async fn sync_delete(&self, request: SyncRequest) -> Result<(), SyncError> {
        let SyncRequest {
            kind,
            snapshot,
            actor,
            ..
        } = request;

        let Some(secondary_id) = snapshot.secondary_id.clone() else {
            // Never synced: nothing to remove, and nothing to announce.
            debug!(
                "delete of {} {} is a no-op, row was never synced",
                kind, snapshot.id
            );
            self.append_log(SyncLogEntry::synced(
                kind,
                snapshot.id,
                SyncAction::Delete,
                None,
                actor,
            ))
            .await;
            return Ok(());
        };

        match self.adapter.remove(kind, &secondary_id).await {
            Ok(()) => {
                self.append_log(SyncLogEntry::synced(
                    kind,
                    snapshot.id,
                    SyncAction::Delete,
                    Some(secondary_id.clone()),
                    actor,
                ))
                .await;
                self.updates.publish(
                    kind,
                    SyncAction::Delete,
                    ChangePayload::Deleted {
                        entity_id: snapshot.id,
                        secondary_id,
                    },
                );
                Ok(())
            }
            Err(err) => {
                warn!("delete of {} {} failed: {}", kind, snapshot.id, err);
                self.append_log(SyncLogEntry::failed(
                    kind,
                    snapshot.id,
                    SyncAction::Delete,
                    err.to_string(),
                    actor,
                ))
                .await;
                Err(err.into())
            }
        }
    }

    /// Appends an audit entry. The log must never fail a sync, so errors are
    /// recorded and swallowed here.
    async fn append_log(&self, entry: SyncLogEntry) {
        if let Err(err) = self.ledger.append_log(entry).await {
            error!("failed to append sync log entry: {}", err);
        }
    }
}
