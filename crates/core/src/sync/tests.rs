//! Tests for the sync orchestrator, dispatcher, and admin service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::broadcast::{BroadcastEvent, UpdatesChannel};
use crate::content::{EntityKind, EntitySnapshot, SyncAction};
use crate::errors::{Error, Result};
use crate::sync::*;

// ============================================================================
// Mocks
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum AdapterCall {
    Upsert {
        kind: EntityKind,
        entity_id: i64,
        secondary_id: Option<String>,
    },
    Remove {
        kind: EntityKind,
        secondary_id: String,
    },
}

/// Adapter double: allocates a fixed key, optionally fails every call.
struct MockAdapter {
    fail: AtomicBool,
    allocates: String,
    calls: Mutex<Vec<AdapterCall>>,
}

impl MockAdapter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: AtomicBool::new(false),
            allocates: "abc123".to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn calls(&self) -> Vec<AdapterCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecondaryStoreAdapter for MockAdapter {
    async fn upsert(
        &self,
        kind: EntityKind,
        snapshot: &EntitySnapshot,
    ) -> std::result::Result<String, AdapterError> {
        self.calls.lock().unwrap().push(AdapterCall::Upsert {
            kind,
            entity_id: snapshot.id,
            secondary_id: snapshot.secondary_id.clone(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(AdapterError::unavailable("connection refused"));
        }
        Ok(snapshot
            .secondary_id
            .clone()
            .unwrap_or_else(|| self.allocates.clone()))
    }

    async fn remove(
        &self,
        kind: EntityKind,
        secondary_id: &str,
    ) -> std::result::Result<(), AdapterError> {
        self.calls.lock().unwrap().push(AdapterCall::Remove {
            kind,
            secondary_id: secondary_id.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(AdapterError::unavailable("connection refused"));
        }
        // Unknown keys count as success, mirroring the idempotent delete
        // contract of real adapters.
        Ok(())
    }
}

/// In-memory ledger double.
#[derive(Default)]
struct MockLedger {
    fail_appends: AtomicBool,
    logs: Mutex<Vec<SyncLogEntry>>,
    marked: Mutex<Vec<(EntityKind, i64, String)>>,
    counts: Mutex<HashMap<EntityKind, (i64, i64)>>,
}

impl MockLedger {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn logs(&self) -> Vec<SyncLogEntry> {
        self.logs.lock().unwrap().clone()
    }

    fn marked(&self) -> Vec<(EntityKind, i64, String)> {
        self.marked.lock().unwrap().clone()
    }

    fn set_counts(&self, kind: EntityKind, total: i64, synced: i64) {
        self.counts.lock().unwrap().insert(kind, (total, synced));
    }
}

#[async_trait]
impl SyncLedgerTrait for MockLedger {
    async fn append_log(&self, entry: SyncLogEntry) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::Unexpected("ledger offline".to_string()));
        }
        self.logs.lock().unwrap().push(entry);
        Ok(())
    }

    async fn mark_synced(
        &self,
        kind: EntityKind,
        entity_id: i64,
        secondary_id: &str,
    ) -> Result<()> {
        self.marked
            .lock()
            .unwrap()
            .push((kind, entity_id, secondary_id.to_string()));
        Ok(())
    }

    fn status_for(&self, kind: EntityKind) -> Result<KindSyncStatus> {
        let (total, synced) = self
            .counts
            .lock()
            .unwrap()
            .get(&kind)
            .copied()
            .unwrap_or((0, 0));
        Ok(KindSyncStatus::from_counts(kind, total, synced))
    }

    fn recent_logs(&self, limit: i64) -> Result<Vec<SyncLogEntry>> {
        let logs = self.logs.lock().unwrap();
        Ok(logs.iter().rev().take(limit as usize).cloned().collect())
    }
}

/// Snapshot provider double backed by a fixed row set.
#[derive(Default)]
struct MockSnapshots {
    rows: Mutex<HashMap<(EntityKind, i64), EntitySnapshot>>,
}

impl MockSnapshots {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn insert(&self, kind: EntityKind, snapshot: EntitySnapshot) {
        self.rows
            .lock()
            .unwrap()
            .insert((kind, snapshot.id), snapshot);
    }
}

impl SnapshotProviderTrait for MockSnapshots {
    fn get_snapshot(&self, kind: EntityKind, id: i64) -> Result<Option<EntitySnapshot>> {
        Ok(self.rows.lock().unwrap().get(&(kind, id)).cloned())
    }

    fn list_snapshots(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>> {
        let rows = self.rows.lock().unwrap();
        let mut out: Vec<EntitySnapshot> = rows
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, v)| v.clone())
            .collect();
        out.sort_by_key(|s| s.id);
        Ok(out)
    }
}

fn snapshot(id: i64, secondary_id: Option<&str>, title: &str) -> EntitySnapshot {
    let mut fields = Map::new();
    fields.insert("id".to_string(), Value::from(id));
    fields.insert("title".to_string(), Value::String(title.to_string()));
    EntitySnapshot {
        id,
        secondary_id: secondary_id.map(String::from),
        last_synced_at: None,
        fields,
    }
}

struct Harness {
    adapter: Arc<MockAdapter>,
    ledger: Arc<MockLedger>,
    updates: UpdatesChannel,
    orchestrator: Arc<SyncOrchestrator>,
}

fn harness() -> Harness {
    let adapter = MockAdapter::new();
    let ledger = MockLedger::new();
    let updates = UpdatesChannel::new();
    let orchestrator = Arc::new(SyncOrchestrator::new(
        adapter.clone(),
        ledger.clone(),
        updates.clone(),
    ));
    Harness {
        adapter,
        ledger,
        updates,
        orchestrator,
    }
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<BroadcastEvent>) -> Vec<BroadcastEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Orchestrator
// ============================================================================

mod orchestrator_tests {
    use super::*;
    use crate::broadcast::ChangePayload;

    #[tokio::test]
    async fn test_create_assigns_key_and_broadcasts() {
        let h = harness();
        let mut rx = h.updates.subscribe();

        let result = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::PortfolioItems,
                SyncAction::Create,
                snapshot(1, None, "Fiber Install"),
                Some("admin@lumen.example".to_string()),
            ))
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("abc123"));
        assert_eq!(
            h.ledger.marked(),
            vec![(EntityKind::PortfolioItems, 1, "abc123".to_string())]
        );

        let logs = h.ledger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SyncOutcome::Synced);
        assert_eq!(logs[0].secondary_id.as_deref(), Some("abc123"));
        assert_eq!(logs[0].actor.as_deref(), Some("admin@lumen.example"));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_kind, EntityKind::PortfolioItems);
        match &events[0].payload {
            ChangePayload::Upserted { fields } => {
                assert_eq!(fields["secondaryId"], "abc123");
                assert_eq!(fields["title"], "Fiber Install");
            }
            other => panic!("expected upsert payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_adapter_failure_is_recorded_not_broadcast() {
        let h = harness();
        h.adapter.set_failing(true);
        let mut rx = h.updates.subscribe();

        let err = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::Bundles,
                SyncAction::Update,
                snapshot(4, Some("key-4"), "Home 20"),
                None,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Adapter(_)));
        // No write-back, one FAILED log entry, nothing announced.
        assert!(h.ledger.marked().is_empty());
        let logs = h.ledger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SyncOutcome::Failed);
        assert!(logs[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection refused"));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_update_without_key_self_heals_to_create() {
        let h = harness();

        let result = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::GalleryImages,
                SyncAction::Update,
                snapshot(7, None, "rooftop run"),
                None,
            ))
            .await
            .unwrap();

        // The adapter saw no prior key and allocated one.
        assert_eq!(result.as_deref(), Some("abc123"));
        assert_eq!(
            h.adapter.calls(),
            vec![AdapterCall::Upsert {
                kind: EntityKind::GalleryImages,
                entity_id: 7,
                secondary_id: None,
            }]
        );
        assert_eq!(h.ledger.marked().len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_key_reuses_it() {
        let h = harness();

        let result = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::Bundles,
                SyncAction::Update,
                snapshot(2, Some("existing"), "Home 50"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("existing"));
    }

    #[tokio::test]
    async fn test_delete_without_key_never_touches_adapter() {
        let h = harness();
        let mut rx = h.updates.subscribe();

        let result = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::ContactMessages,
                SyncAction::Delete,
                EntitySnapshot::delete_marker(3, None),
                None,
            ))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(h.adapter.calls().is_empty());
        // Logged as a successful no-op, but nothing broadcast.
        let logs = h.ledger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SyncOutcome::Synced);
        assert!(logs[0].secondary_id.is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let h = harness();

        for _ in 0..2 {
            h.orchestrator
                .sync_entity(SyncRequest::new(
                    EntityKind::Bundles,
                    SyncAction::Delete,
                    EntitySnapshot::delete_marker(5, Some("key-5".to_string())),
                    None,
                ))
                .await
                .unwrap();
        }

        assert_eq!(h.adapter.calls().len(), 2);
        assert_eq!(h.ledger.logs().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_broadcasts_marker() {
        let h = harness();
        let mut rx = h.updates.subscribe();

        h.orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::PortfolioItems,
                SyncAction::Delete,
                EntitySnapshot::delete_marker(9, Some("key-9".to_string())),
                None,
            ))
            .await
            .unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            ChangePayload::Deleted {
                entity_id,
                secondary_id,
            } => {
                assert_eq!(*entity_id, 9);
                assert_eq!(secondary_id, "key-9");
            }
            other => panic!("expected delete marker, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ledger_append_failure_does_not_fail_sync() {
        let h = harness();
        h.ledger.fail_appends.store(true, Ordering::SeqCst);
        let mut rx = h.updates.subscribe();

        let result = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::Bundles,
                SyncAction::Create,
                snapshot(1, None, "Home 20"),
                None,
            ))
            .await;

        assert!(result.is_ok());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected() {
        let h = harness();

        let err = h
            .orchestrator
            .sync_entity(SyncRequest::new(
                EntityKind::Bundles,
                SyncAction::Create,
                EntitySnapshot::delete_marker(0, None),
                None,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::InvalidRequest(_)));
        assert!(h.adapter.calls().is_empty());
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

mod dispatcher_tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_and_wait_idle() {
        let h = harness();
        let dispatcher = spawn_sync_worker(h.orchestrator.clone());

        dispatcher.dispatch(SyncRequest::new(
            EntityKind::Bundles,
            SyncAction::Create,
            snapshot(1, None, "Home 20"),
            None,
        ));
        dispatcher.wait_idle().await;

        assert_eq!(h.ledger.marked().len(), 1);
    }

    #[tokio::test]
    async fn test_same_entity_mutations_stay_ordered() {
        let h = harness();
        let dispatcher = spawn_sync_worker(h.orchestrator.clone());

        dispatcher.dispatch(SyncRequest::new(
            EntityKind::Bundles,
            SyncAction::Update,
            snapshot(1, Some("key-1"), "Home 20"),
            None,
        ));
        dispatcher.dispatch(SyncRequest::new(
            EntityKind::Bundles,
            SyncAction::Delete,
            EntitySnapshot::delete_marker(1, Some("key-1".to_string())),
            None,
        ));
        dispatcher.wait_idle().await;

        // FIFO processing: the delete lands after the update, so the
        // secondary record stays deleted.
        assert_eq!(
            h.adapter.calls(),
            vec![
                AdapterCall::Upsert {
                    kind: EntityKind::Bundles,
                    entity_id: 1,
                    secondary_id: Some("key-1".to_string()),
                },
                AdapterCall::Remove {
                    kind: EntityKind::Bundles,
                    secondary_id: "key-1".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_sync_never_reaches_dispatch_caller() {
        let h = harness();
        h.adapter.set_failing(true);
        let dispatcher = spawn_sync_worker(h.orchestrator.clone());

        // dispatch() has no error channel by design; the only observable
        // outcome is the failed ledger entry.
        dispatcher.dispatch(SyncRequest::new(
            EntityKind::Bundles,
            SyncAction::Create,
            snapshot(1, None, "Home 20"),
            None,
        ));
        dispatcher.wait_idle().await;

        let logs = h.ledger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SyncOutcome::Failed);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_idle() {
        let h = harness();
        let dispatcher = spawn_sync_worker(h.orchestrator.clone());
        dispatcher.wait_idle().await;
    }
}

// ============================================================================
// Admin service
// ============================================================================

mod admin_tests {
    use super::*;

    fn admin_harness() -> (Harness, Arc<MockSnapshots>, SyncAdminService) {
        let h = harness();
        let snapshots = MockSnapshots::new();
        let admin = SyncAdminService::new(h.orchestrator.clone(), snapshots.clone(), h.ledger.clone());
        (h, snapshots, admin)
    }

    #[tokio::test]
    async fn test_resync_entity_upserts_current_row() {
        let (h, snapshots, admin) = admin_harness();
        snapshots.insert(
            EntityKind::PortfolioItems,
            snapshot(1, None, "Fiber Install"),
        );

        let secondary_id = admin
            .resync_entity(EntityKind::PortfolioItems, 1, Some("ops".to_string()))
            .await
            .unwrap();

        assert_eq!(secondary_id, "abc123");
        assert_eq!(h.ledger.marked().len(), 1);
    }

    #[tokio::test]
    async fn test_resync_missing_row_is_not_found() {
        let (_h, _snapshots, admin) = admin_harness();

        let err = admin
            .resync_entity(EntityKind::Bundles, 42, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::NotFound {
                kind: EntityKind::Bundles,
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn test_resync_all_counts_per_kind() {
        let (h, snapshots, admin) = admin_harness();
        snapshots.insert(EntityKind::Bundles, snapshot(1, None, "Home 20"));
        snapshots.insert(EntityKind::Bundles, snapshot(2, None, "Home 50"));
        snapshots.insert(EntityKind::GalleryImages, snapshot(1, None, "img"));

        let summaries = admin.resync_all(None).await.unwrap();

        let bundles = summaries
            .iter()
            .find(|s| s.entity_kind == EntityKind::Bundles)
            .unwrap();
        assert_eq!(bundles.synced, 2);
        assert_eq!(bundles.failed, 0);
        // Three upserts total across kinds.
        assert_eq!(h.adapter.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_resync_all_keeps_going_after_failures() {
        let (h, snapshots, admin) = admin_harness();
        h.adapter.set_failing(true);
        snapshots.insert(EntityKind::Bundles, snapshot(1, None, "Home 20"));
        snapshots.insert(EntityKind::Bundles, snapshot(2, None, "Home 50"));

        let summaries = admin.resync_all(None).await.unwrap();

        let bundles = summaries
            .iter()
            .find(|s| s.entity_kind == EntityKind::Bundles)
            .unwrap();
        assert_eq!(bundles.synced, 0);
        assert_eq!(bundles.failed, 2);
    }

    #[tokio::test]
    async fn test_status_reports_every_kind() {
        let (h, _snapshots, admin) = admin_harness();
        h.ledger.set_counts(EntityKind::PortfolioItems, 10, 9);
        h.ledger.set_counts(EntityKind::Bundles, 4, 4);

        let statuses = admin.status().unwrap();

        assert_eq!(statuses.len(), EntityKind::ALL.len());
        for status in &statuses {
            assert_eq!(status.synced + status.failed_or_pending, status.total);
        }
        let portfolio = statuses
            .iter()
            .find(|s| s.entity_kind == EntityKind::PortfolioItems)
            .unwrap();
        assert_eq!(portfolio.failed_or_pending, 1);
        assert_eq!(portfolio.percentage, 90);
    }

    #[tokio::test]
    async fn test_recent_logs_newest_first() {
        let (h, snapshots, admin) = admin_harness();
        snapshots.insert(EntityKind::Bundles, snapshot(1, None, "Home 20"));
        snapshots.insert(EntityKind::Bundles, snapshot(2, None, "Home 50"));
        admin.resync_all(None).await.unwrap();

        let logs = admin.recent_logs(Some(1)).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].entity_id, 2);
    }
}
