use diesel::prelude::*;
use std::sync::Arc;

use lumen_core::content::{NewPortfolioItem, PortfolioItem, PortfolioItemUpdate};
use lumen_core::errors::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::portfolio_items;

use super::model::{NewPortfolioItemDB, PortfolioItemChangesDB, PortfolioItemDB};

/// Repository for managing portfolio items in the database.
pub struct PortfolioRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub async fn create(&self, new_item: NewPortfolioItem) -> Result<PortfolioItem> {
        new_item.validate()?;

        self.writer
            .exec(move |conn| {
                let db_item: NewPortfolioItemDB = new_item.into();
                let inserted: PortfolioItemDB = diesel::insert_into(portfolio_items::table)
                    .values(&db_item)
                    .returning(PortfolioItemDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    pub async fn update(&self, item_id: i64, update: PortfolioItemUpdate) -> Result<PortfolioItem> {
        update.validate()?;

        self.writer
            .exec(move |conn| {
                let existing: PortfolioItemDB = portfolio_items::table
                    .find(item_id)
                    .select(PortfolioItemDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                let changes = PortfolioItemChangesDB::merge(&existing, update);
                let updated: PortfolioItemDB = diesel::update(portfolio_items::table.find(item_id))
                    .set(&changes)
                    .returning(PortfolioItemDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    /// Deletes the row and returns its last state, so the caller can hand
    /// the sync subsystem the secondary key to remove.
    pub async fn delete(&self, item_id: i64) -> Result<PortfolioItem> {
        self.writer
            .exec(move |conn| {
                let existing: PortfolioItemDB = portfolio_items::table
                    .find(item_id)
                    .select(PortfolioItemDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                diesel::delete(portfolio_items::table.find(item_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(existing.into())
            })
            .await
    }

    pub fn get_by_id(&self, item_id: i64) -> Result<PortfolioItem> {
        let mut conn = get_connection(&self.pool)?;

        let item: PortfolioItemDB = portfolio_items::table
            .find(item_id)
            .select(PortfolioItemDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(item.into())
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<PortfolioItem>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = portfolio_items::table.into_boxed();
        if !include_inactive {
            query = query.filter(portfolio_items::is_active.eq(true));
        }

        let rows: Vec<PortfolioItemDB> = query
            .select(PortfolioItemDB::as_select())
            .order((
                portfolio_items::display_order.asc(),
                portfolio_items::created_at.desc(),
            ))
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(PortfolioItem::from).collect())
    }
}
