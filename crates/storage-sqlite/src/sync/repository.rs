//! The sync ledger: write-back columns plus the append-only attempt log.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use lumen_core::content::{
    Bundle, ContactMessage, EntityKind, EntitySnapshot, GalleryImage, PortfolioItem,
};
use lumen_core::errors::Result;
use lumen_core::sync::{
    KindSyncStatus, SnapshotProviderTrait, SyncLedgerTrait, SyncLogEntry,
};

use crate::bundles::model::BundleDB;
use crate::contact::model::ContactMessageDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::gallery::model::GalleryImageDB;
use crate::portfolio::model::PortfolioItemDB;
use crate::schema::{bundles, contact_messages, gallery_images, portfolio_items, sync_logs};

use super::model::SyncLogDB;

/// Diesel-backed implementation of the sync ledger and snapshot provider.
pub struct SyncRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncLedgerTrait for SyncRepository {
    async fn append_log(&self, entry: SyncLogEntry) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let db_entry: SyncLogDB = entry.into();
                diesel::insert_into(sync_logs::table)
                    .values(&db_entry)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn mark_synced(
        &self,
        kind: EntityKind,
        entity_id: i64,
        secondary_id: &str,
    ) -> Result<()> {
        let key = secondary_id.to_string();
        self.writer
            .exec(move |conn| {
                let now = Utc::now().naive_utc();
                // A zero row count means the row was deleted while its sync
                // was in flight; nothing to record in that case.
                let _affected = match kind {
                    EntityKind::PortfolioItems => {
                        diesel::update(portfolio_items::table.find(entity_id))
                            .set((
                                portfolio_items::secondary_id.eq(Some(key)),
                                portfolio_items::last_synced_at.eq(Some(now)),
                            ))
                            .execute(conn)
                    }
                    EntityKind::GalleryImages => {
                        diesel::update(gallery_images::table.find(entity_id))
                            .set((
                                gallery_images::secondary_id.eq(Some(key)),
                                gallery_images::last_synced_at.eq(Some(now)),
                            ))
                            .execute(conn)
                    }
                    EntityKind::Bundles => diesel::update(bundles::table.find(entity_id))
                        .set((
                            bundles::secondary_id.eq(Some(key)),
                            bundles::last_synced_at.eq(Some(now)),
                        ))
                        .execute(conn),
                    EntityKind::ContactMessages => {
                        diesel::update(contact_messages::table.find(entity_id))
                            .set((
                                contact_messages::secondary_id.eq(Some(key)),
                                contact_messages::last_synced_at.eq(Some(now)),
                            ))
                            .execute(conn)
                    }
                }
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn status_for(&self, kind: EntityKind) -> Result<KindSyncStatus> {
        let mut conn = get_connection(&self.pool)?;

        let (total, synced): (i64, i64) = match kind {
            EntityKind::PortfolioItems => (
                portfolio_items::table
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
                portfolio_items::table
                    .filter(portfolio_items::secondary_id.is_not_null())
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
            ),
            EntityKind::GalleryImages => (
                gallery_images::table
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
                gallery_images::table
                    .filter(gallery_images::secondary_id.is_not_null())
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
            ),
            EntityKind::Bundles => (
                bundles::table
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
                bundles::table
                    .filter(bundles::secondary_id.is_not_null())
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
            ),
            EntityKind::ContactMessages => (
                contact_messages::table
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
                contact_messages::table
                    .filter(contact_messages::secondary_id.is_not_null())
                    .count()
                    .get_result(&mut conn)
                    .map_err(StorageError::from)?,
            ),
        };

        Ok(KindSyncStatus::from_counts(kind, total, synced))
    }

    fn recent_logs(&self, limit: i64) -> Result<Vec<SyncLogEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<SyncLogDB> = sync_logs::table
            .select(SyncLogDB::as_select())
            .order(sync_logs::created_at.desc())
            .limit(limit)
            .load(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(SyncLogEntry::try_from).collect()
    }
}

impl SnapshotProviderTrait for SyncRepository {
    fn get_snapshot(&self, kind: EntityKind, id: i64) -> Result<Option<EntitySnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let snapshot = match kind {
            EntityKind::PortfolioItems => portfolio_items::table
                .find(id)
                .select(PortfolioItemDB::as_select())
                .first(&mut conn)
                .optional()
                .map_err(StorageError::from)?
                .map(|row| PortfolioItem::from(row).snapshot())
                .transpose()?,
            EntityKind::GalleryImages => gallery_images::table
                .find(id)
                .select(GalleryImageDB::as_select())
                .first(&mut conn)
                .optional()
                .map_err(StorageError::from)?
                .map(|row| GalleryImage::from(row).snapshot())
                .transpose()?,
            EntityKind::Bundles => bundles::table
                .find(id)
                .select(BundleDB::as_select())
                .first(&mut conn)
                .optional()
                .map_err(StorageError::from)?
                .map(|row| Bundle::from(row).snapshot())
                .transpose()?,
            EntityKind::ContactMessages => contact_messages::table
                .find(id)
                .select(ContactMessageDB::as_select())
                .first(&mut conn)
                .optional()
                .map_err(StorageError::from)?
                .map(|row| ContactMessage::from(row).snapshot())
                .transpose()?,
        };

        Ok(snapshot)
    }

    fn list_snapshots(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        match kind {
            EntityKind::PortfolioItems => portfolio_items::table
                .filter(portfolio_items::is_active.eq(true))
                .select(PortfolioItemDB::as_select())
                .load::<PortfolioItemDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PortfolioItem::from(row).snapshot())
                .collect(),
            EntityKind::GalleryImages => gallery_images::table
                .filter(gallery_images::is_active.eq(true))
                .select(GalleryImageDB::as_select())
                .load::<GalleryImageDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| GalleryImage::from(row).snapshot())
                .collect(),
            EntityKind::Bundles => bundles::table
                .filter(bundles::is_active.eq(true))
                .select(BundleDB::as_select())
                .load::<BundleDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| Bundle::from(row).snapshot())
                .collect(),
            // Contact messages have no active flag; every stored message
            // participates in a resync.
            EntityKind::ContactMessages => contact_messages::table
                .select(ContactMessageDB::as_select())
                .load::<ContactMessageDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| ContactMessage::from(row).snapshot())
                .collect(),
        }
    }
}
