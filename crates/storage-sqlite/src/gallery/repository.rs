use diesel::prelude::*;
use std::sync::Arc;

use lumen_core::content::{GalleryImage, GalleryImageUpdate, NewGalleryImage};
use lumen_core::errors::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::gallery_images;

use super::model::{GalleryImageChangesDB, GalleryImageDB, NewGalleryImageDB};

/// Repository for managing gallery images in the database.
pub struct GalleryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GalleryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub async fn create(&self, new_image: NewGalleryImage) -> Result<GalleryImage> {
        new_image.validate()?;

        self.writer
            .exec(move |conn| {
                let db_image: NewGalleryImageDB = new_image.into();
                let inserted: GalleryImageDB = diesel::insert_into(gallery_images::table)
                    .values(&db_image)
                    .returning(GalleryImageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    pub async fn update(&self, image_id: i64, update: GalleryImageUpdate) -> Result<GalleryImage> {
        self.writer
            .exec(move |conn| {
                let existing: GalleryImageDB = gallery_images::table
                    .find(image_id)
                    .select(GalleryImageDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                let changes = GalleryImageChangesDB::merge(&existing, update);
                let updated: GalleryImageDB = diesel::update(gallery_images::table.find(image_id))
                    .set(&changes)
                    .returning(GalleryImageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    pub async fn delete(&self, image_id: i64) -> Result<GalleryImage> {
        self.writer
            .exec(move |conn| {
                let existing: GalleryImageDB = gallery_images::table
                    .find(image_id)
                    .select(GalleryImageDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                diesel::delete(gallery_images::table.find(image_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(existing.into())
            })
            .await
    }

    pub fn get_by_id(&self, image_id: i64) -> Result<GalleryImage> {
        let mut conn = get_connection(&self.pool)?;

        let image: GalleryImageDB = gallery_images::table
            .find(image_id)
            .select(GalleryImageDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(image.into())
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<GalleryImage>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = gallery_images::table.into_boxed();
        if !include_inactive {
            query = query.filter(gallery_images::is_active.eq(true));
        }

        let rows: Vec<GalleryImageDB> = query
            .select(GalleryImageDB::as_select())
            .order((
                gallery_images::display_order.asc(),
                gallery_images::uploaded_at.desc(),
            ))
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(GalleryImage::from).collect())
    }
}
