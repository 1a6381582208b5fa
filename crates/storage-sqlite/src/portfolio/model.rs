//! Database model for portfolio items.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use lumen_core::content::{NewPortfolioItem, PortfolioItem, PortfolioItemUpdate};

use crate::schema::portfolio_items;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = portfolio_items)]
pub struct PortfolioItemDB {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = portfolio_items)]
pub struct NewPortfolioItemDB {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for CRUD updates.
///
/// Deliberately excludes `secondary_id`/`last_synced_at`: those columns are
/// owned by the sync ledger and written only via its targeted update.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = portfolio_items, treat_none_as_null = true)]
pub struct PortfolioItemChangesDB {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

impl PortfolioItemChangesDB {
    /// Merges an update onto the existing row; absent fields keep their value.
    pub fn merge(existing: &PortfolioItemDB, update: PortfolioItemUpdate) -> Self {
        Self {
            title: update.title.unwrap_or_else(|| existing.title.clone()),
            description: update
                .description
                .unwrap_or_else(|| existing.description.clone()),
            image_url: update.image_url.or_else(|| existing.image_url.clone()),
            category: update.category.or_else(|| existing.category.clone()),
            display_order: update.display_order.unwrap_or(existing.display_order),
            is_active: update.is_active.unwrap_or(existing.is_active),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<PortfolioItemDB> for PortfolioItem {
    fn from(db: PortfolioItemDB) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            image_url: db.image_url,
            category: db.category,
            display_order: db.display_order,
            is_active: db.is_active,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
            secondary_id: db.secondary_id,
            last_synced_at: db.last_synced_at.map(|ts| ts.and_utc()),
        }
    }
}

impl From<NewPortfolioItem> for NewPortfolioItemDB {
    fn from(item: NewPortfolioItem) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            title: item.title,
            description: item.description,
            image_url: item.image_url,
            category: item.category,
            display_order: item.display_order.unwrap_or(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
