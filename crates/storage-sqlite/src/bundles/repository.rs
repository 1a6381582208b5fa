use diesel::prelude::*;
use std::sync::Arc;

use lumen_core::content::{Bundle, BundleUpdate, NewBundle};
use lumen_core::errors::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::bundles;

use super::model::{BundleChangesDB, BundleDB, NewBundleDB};

/// Repository for managing bundles in the database.
pub struct BundleRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BundleRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub async fn create(&self, new_bundle: NewBundle) -> Result<Bundle> {
        new_bundle.validate()?;

        self.writer
            .exec(move |conn| {
                let db_bundle: NewBundleDB = new_bundle.into();
                let inserted: BundleDB = diesel::insert_into(bundles::table)
                    .values(&db_bundle)
                    .returning(BundleDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    pub async fn update(&self, bundle_id: i64, update: BundleUpdate) -> Result<Bundle> {
        update.validate()?;

        self.writer
            .exec(move |conn| {
                let existing: BundleDB = bundles::table
                    .find(bundle_id)
                    .select(BundleDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                let changes = BundleChangesDB::merge(&existing, update);
                let updated: BundleDB = diesel::update(bundles::table.find(bundle_id))
                    .set(&changes)
                    .returning(BundleDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    pub async fn delete(&self, bundle_id: i64) -> Result<Bundle> {
        self.writer
            .exec(move |conn| {
                let existing: BundleDB = bundles::table
                    .find(bundle_id)
                    .select(BundleDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                diesel::delete(bundles::table.find(bundle_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(existing.into())
            })
            .await
    }

    pub fn get_by_id(&self, bundle_id: i64) -> Result<Bundle> {
        let mut conn = get_connection(&self.pool)?;

        let bundle: BundleDB = bundles::table
            .find(bundle_id)
            .select(BundleDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(bundle.into())
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Bundle>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = bundles::table.into_boxed();
        if !include_inactive {
            query = query.filter(bundles::is_active.eq(true));
        }

        let rows: Vec<BundleDB> = query
            .select(BundleDB::as_select())
            .order((bundles::display_order.asc(), bundles::created_at.desc()))
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(Bundle::from).collect())
    }
}
