//! Integration tests exercising migrations, CRUD, and the sync ledger
//! against a real on-disk SQLite database.

use std::sync::Arc;

use lumen_core::content::{
    EntityKind, NewBundle, NewContactMessage, NewPortfolioItem, PortfolioItemUpdate, SyncAction,
};
use lumen_core::sync::{SnapshotProviderTrait, SyncLedgerTrait, SyncLogEntry, SyncOutcome};
use lumen_storage_sqlite::bundles::BundleRepository;
use lumen_storage_sqlite::contact::ContactRepository;
use lumen_storage_sqlite::db::{self, write_actor, DbPool, WriteHandle};
use lumen_storage_sqlite::portfolio::PortfolioRepository;
use lumen_storage_sqlite::sync::SyncRepository;
use rust_decimal_macros::dec;
use tempfile::TempDir;

struct TestDb {
    // Held so the database file outlives the test body.
    _dir: TempDir,
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

fn setup() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lumen.db").to_string_lossy().to_string();
    db::init(dir.path().to_str().unwrap()).ok();

    let pool = db::create_pool(&db_path).unwrap();
    db::run_migrations(&pool).unwrap();
    let writer = write_actor::spawn_writer((*pool).clone());

    TestDb {
        _dir: dir,
        pool,
        writer,
    }
}

fn new_item(title: &str) -> NewPortfolioItem {
    NewPortfolioItem {
        title: title.to_string(),
        description: "Fiber to the home install".to_string(),
        image_url: None,
        category: Some("residential".to_string()),
        display_order: None,
    }
}

#[tokio::test]
async fn test_portfolio_crud_round_trip() {
    let db = setup();
    let repo = PortfolioRepository::new(db.pool.clone(), db.writer.clone());

    let created = repo.create(new_item("Fiber Install")).await.unwrap();
    assert!(created.id > 0);
    assert!(created.is_active);
    assert!(created.secondary_id.is_none());

    let fetched = repo.get_by_id(created.id).unwrap();
    assert_eq!(fetched.title, "Fiber Install");

    let updated = repo
        .update(
            created.id,
            PortfolioItemUpdate {
                title: Some("Fiber Install — Phase 2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Fiber Install — Phase 2");
    assert_eq!(updated.description, created.description);

    let deleted = repo.delete(created.id).await.unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(repo.get_by_id(created.id).is_err());
}

#[tokio::test]
async fn test_crud_update_preserves_sync_columns() {
    let db = setup();
    let repo = PortfolioRepository::new(db.pool.clone(), db.writer.clone());
    let ledger = SyncRepository::new(db.pool.clone(), db.writer.clone());

    let created = repo.create(new_item("Fiber Install")).await.unwrap();
    ledger
        .mark_synced(EntityKind::PortfolioItems, created.id, "abc123")
        .await
        .unwrap();

    // A content edit must not clobber the ledger-owned columns.
    let updated = repo
        .update(
            created.id,
            PortfolioItemUpdate {
                description: Some("Updated description".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.secondary_id.as_deref(), Some("abc123"));
    assert!(updated.last_synced_at.is_some());
}

#[tokio::test]
async fn test_mark_synced_sets_both_columns() {
    let db = setup();
    let repo = BundleRepository::new(db.pool.clone(), db.writer.clone());
    let ledger = SyncRepository::new(db.pool.clone(), db.writer.clone());

    let bundle = repo
        .create(NewBundle {
            name: "Home 20".to_string(),
            price: dec!(2999.00),
            description: "20 Mbps unlimited".to_string(),
            validity: Some("30 days".to_string()),
            data_amount: None,
            display_order: None,
        })
        .await
        .unwrap();
    assert!(bundle.last_synced_at.is_none());

    ledger
        .mark_synced(EntityKind::Bundles, bundle.id, "key-1")
        .await
        .unwrap();

    let synced = repo.get_by_id(bundle.id).unwrap();
    assert_eq!(synced.secondary_id.as_deref(), Some("key-1"));
    assert!(synced.last_synced_at.is_some());
    assert_eq!(synced.price, dec!(2999.00));
}

#[tokio::test]
async fn test_mark_synced_for_missing_row_is_harmless() {
    let db = setup();
    let ledger = SyncRepository::new(db.pool.clone(), db.writer.clone());

    ledger
        .mark_synced(EntityKind::Bundles, 999, "key")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_status_counts_partition_totals() {
    let db = setup();
    let repo = PortfolioRepository::new(db.pool.clone(), db.writer.clone());
    let ledger = SyncRepository::new(db.pool.clone(), db.writer.clone());

    for n in 0..3 {
        repo.create(new_item(&format!("Item {n}"))).await.unwrap();
    }
    let items = repo.list(true).unwrap();
    ledger
        .mark_synced(EntityKind::PortfolioItems, items[0].id, "k0")
        .await
        .unwrap();

    let status = ledger.status_for(EntityKind::PortfolioItems).unwrap();
    assert_eq!(status.total, 3);
    assert_eq!(status.synced, 1);
    assert_eq!(status.failed_or_pending, 2);
    assert_eq!(status.synced + status.failed_or_pending, status.total);

    // Untouched kinds report an empty, fully-synced table.
    let gallery = ledger.status_for(EntityKind::GalleryImages).unwrap();
    assert_eq!(gallery.total, 0);
    assert_eq!(gallery.percentage, 100);
}

#[tokio::test]
async fn test_log_append_and_recent_order() {
    let db = setup();
    let ledger = SyncRepository::new(db.pool.clone(), db.writer.clone());

    ledger
        .append_log(SyncLogEntry::synced(
            EntityKind::Bundles,
            1,
            SyncAction::Create,
            Some("k1".to_string()),
            None,
        ))
        .await
        .unwrap();
    ledger
        .append_log(SyncLogEntry::failed(
            EntityKind::Bundles,
            2,
            SyncAction::Update,
            "connection refused".to_string(),
            Some("ops".to_string()),
        ))
        .await
        .unwrap();

    let logs = ledger.recent_logs(10).unwrap();
    assert_eq!(logs.len(), 2);
    // Newest first.
    assert_eq!(logs[0].entity_id, 2);
    assert_eq!(logs[0].status, SyncOutcome::Failed);
    assert_eq!(logs[0].actor.as_deref(), Some("ops"));
    assert_eq!(logs[1].status, SyncOutcome::Synced);

    let limited = ledger.recent_logs(1).unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_snapshots_reflect_rows() {
    let db = setup();
    let portfolio = PortfolioRepository::new(db.pool.clone(), db.writer.clone());
    let contact = ContactRepository::new(db.pool.clone(), db.writer.clone());
    let ledger = SyncRepository::new(db.pool.clone(), db.writer.clone());

    let item = portfolio.create(new_item("Fiber Install")).await.unwrap();
    contact
        .create(NewContactMessage {
            name: "Jordan".to_string(),
            email: "jordan@example.com".to_string(),
            message: "How much for an install?".to_string(),
        })
        .await
        .unwrap();

    let snapshot = ledger
        .get_snapshot(EntityKind::PortfolioItems, item.id)
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.id, item.id);
    assert_eq!(snapshot.fields["title"], "Fiber Install");
    assert!(!snapshot.fields.contains_key("secondaryId"));

    assert!(ledger
        .get_snapshot(EntityKind::PortfolioItems, 999)
        .unwrap()
        .is_none());

    let contacts = ledger.list_snapshots(EntityKind::ContactMessages).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].fields["email"], "jordan@example.com");

    // Deactivated rows drop out of kind-wide listings.
    portfolio
        .update(
            item.id,
            PortfolioItemUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(ledger
        .list_snapshots(EntityKind::PortfolioItems)
        .unwrap()
        .is_empty());
}
