//! Database model for data bundles.

use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use log::warn;
use rust_decimal::Decimal;

use lumen_core::content::{Bundle, BundleUpdate, NewBundle};

use crate::schema::bundles;

/// Parses a stored price, falling back to zero on corrupt data.
fn parse_price(value: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(price) => price,
        Err(err) => {
            warn!("Failed to parse stored price '{}': {}. Falling back to ZERO.", value, err);
            Decimal::ZERO
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = bundles)]
pub struct BundleDB {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub description: String,
    pub validity: Option<String>,
    pub data_amount: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = bundles)]
pub struct NewBundleDB {
    pub name: String,
    pub price: String,
    pub description: String,
    pub validity: Option<String>,
    pub data_amount: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for the editable columns; sync columns stay untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = bundles, treat_none_as_null = true)]
pub struct BundleChangesDB {
    pub name: String,
    pub price: String,
    pub description: String,
    pub validity: Option<String>,
    pub data_amount: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

impl BundleChangesDB {
    pub fn merge(existing: &BundleDB, update: BundleUpdate) -> Self {
        Self {
            name: update.name.unwrap_or_else(|| existing.name.clone()),
            price: update
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| existing.price.clone()),
            description: update
                .description
                .unwrap_or_else(|| existing.description.clone()),
            validity: update.validity.or_else(|| existing.validity.clone()),
            data_amount: update.data_amount.or_else(|| existing.data_amount.clone()),
            display_order: update.display_order.unwrap_or(existing.display_order),
            is_active: update.is_active.unwrap_or(existing.is_active),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<BundleDB> for Bundle {
    fn from(db: BundleDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            price: parse_price(&db.price),
            description: db.description,
            validity: db.validity,
            data_amount: db.data_amount,
            display_order: db.display_order,
            is_active: db.is_active,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
            secondary_id: db.secondary_id,
            last_synced_at: db.last_synced_at.map(|ts| ts.and_utc()),
        }
    }
}

impl From<NewBundle> for NewBundleDB {
    fn from(bundle: NewBundle) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            name: bundle.name,
            price: bundle.price.to_string(),
            description: bundle.description,
            validity: bundle.validity,
            data_amount: bundle.data_amount,
            display_order: bundle.display_order.unwrap_or(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
