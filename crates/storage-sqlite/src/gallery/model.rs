//! Database model for gallery images.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use lumen_core::content::{GalleryImage, GalleryImageUpdate, NewGalleryImage};

use crate::schema::gallery_images;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = gallery_images)]
pub struct GalleryImageDB {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub uploaded_at: NaiveDateTime,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = gallery_images)]
pub struct NewGalleryImageDB {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub uploaded_at: NaiveDateTime,
}

/// Changeset for the editable columns; sync columns stay untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = gallery_images, treat_none_as_null = true)]
pub struct GalleryImageChangesDB {
    pub caption: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

impl GalleryImageChangesDB {
    pub fn merge(existing: &GalleryImageDB, update: GalleryImageUpdate) -> Self {
        Self {
            caption: update.caption.or_else(|| existing.caption.clone()),
            display_order: update.display_order.unwrap_or(existing.display_order),
            is_active: update.is_active.unwrap_or(existing.is_active),
        }
    }
}

impl From<GalleryImageDB> for GalleryImage {
    fn from(db: GalleryImageDB) -> Self {
        Self {
            id: db.id,
            filename: db.filename,
            original_name: db.original_name,
            path: db.path,
            url: db.url,
            caption: db.caption,
            display_order: db.display_order,
            is_active: db.is_active,
            uploaded_at: db.uploaded_at.and_utc(),
            secondary_id: db.secondary_id,
            last_synced_at: db.last_synced_at.map(|ts| ts.and_utc()),
        }
    }
}

impl From<NewGalleryImage> for NewGalleryImageDB {
    fn from(image: NewGalleryImage) -> Self {
        Self {
            filename: image.filename,
            original_name: image.original_name,
            path: image.path,
            url: image.url,
            caption: image.caption,
            display_order: image.display_order.unwrap_or(0),
            is_active: true,
            uploaded_at: Utc::now().naive_utc(),
        }
    }
}
