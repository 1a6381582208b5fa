//! Administrative sync surface: status reports and force-resync.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::content::{EntityKind, SyncAction};
use crate::errors::Result;
use crate::sync::errors::SyncError;
use crate::sync::log_model::{KindSyncStatus, SyncLogEntry};
use crate::sync::orchestrator::{SyncOrchestrator, SyncRequest};
use crate::sync::traits::{SnapshotProviderTrait, SyncLedgerTrait};

/// Default number of log entries shown on the status surface.
pub const DEFAULT_RECENT_LOGS: i64 = 10;

/// Outcome of a kind-wide force resync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncSummary {
    pub entity_kind: EntityKind,
    pub synced: usize,
    pub failed: usize,
}

/// Service behind the authenticated admin endpoints.
///
/// Unlike the dispatcher path, resync runs the orchestrator inline and
/// reports the outcome to the (administrative) caller.
pub struct SyncAdminService {
    orchestrator: Arc<SyncOrchestrator>,
    snapshots: Arc<dyn SnapshotProviderTrait>,
    ledger: Arc<dyn SyncLedgerTrait>,
}

impl SyncAdminService {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        snapshots: Arc<dyn SnapshotProviderTrait>,
        ledger: Arc<dyn SyncLedgerTrait>,
    ) -> Self {
        Self {
            orchestrator,
            snapshots,
            ledger,
        }
    }

    /// Re-runs sync for one row. Upserts regardless of current state: a row
    /// with no secondary key gets one allocated, a synced row is refreshed.
    pub async fn resync_entity(
        &self,
        kind: EntityKind,
        id: i64,
        actor: Option<String>,
    ) -> std::result::Result<String, SyncError> {
        let snapshot = self
            .snapshots
            .get_snapshot(kind, id)
            .map_err(|e| SyncError::Ledger(e.to_string()))?
            .ok_or(SyncError::NotFound { kind, id })?;

        let secondary_id = self
            .orchestrator
            .sync_entity(SyncRequest::new(kind, SyncAction::Update, snapshot, actor))
            .await?
            .unwrap_or_default();
        Ok(secondary_id)
    }

    /// Re-runs sync for every active row of every kind.
    ///
    /// Individual failures are counted, not propagated — a half-down
    /// secondary store should still let the reachable rows through.
    pub async fn resync_all(&self, actor: Option<String>) -> Result<Vec<ResyncSummary>> {
        let mut summaries = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let rows = self.snapshots.list_snapshots(kind)?;
            let mut synced = 0usize;
            let mut failed = 0usize;
            for snapshot in rows {
                let request =
                    SyncRequest::new(kind, SyncAction::Update, snapshot, actor.clone());
                match self.orchestrator.sync_entity(request).await {
                    Ok(_) => synced += 1,
                    Err(_) => failed += 1,
                }
            }
            info!("resync of {}: {} synced, {} failed", kind, synced, failed);
            summaries.push(ResyncSummary {
                entity_kind: kind,
                synced,
                failed,
            });
        }
        Ok(summaries)
    }

    /// Per-kind sync coverage, for every kind.
    pub fn status(&self) -> Result<Vec<KindSyncStatus>> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| self.ledger.status_for(kind))
            .collect()
    }

    /// Most recent sync attempts, newest first.
    pub fn recent_logs(&self, limit: Option<i64>) -> Result<Vec<SyncLogEntry>> {
        self.ledger.recent_logs(limit.unwrap_or(DEFAULT_RECENT_LOGS))
    }
}
