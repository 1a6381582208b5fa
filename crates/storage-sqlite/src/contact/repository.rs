use diesel::prelude::*;
use std::sync::Arc;

use lumen_core::content::{ContactMessage, ContactMessageUpdate, NewContactMessage};
use lumen_core::errors::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::contact_messages;

use super::model::{ContactMessageDB, NewContactMessageDB};

/// Repository for managing contact messages in the database.
pub struct ContactRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ContactRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub async fn create(&self, new_message: NewContactMessage) -> Result<ContactMessage> {
        new_message.validate()?;

        self.writer
            .exec(move |conn| {
                let db_message: NewContactMessageDB = new_message.into();
                let inserted: ContactMessageDB = diesel::insert_into(contact_messages::table)
                    .values(&db_message)
                    .returning(ContactMessageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    pub async fn update(
        &self,
        message_id: i64,
        update: ContactMessageUpdate,
    ) -> Result<ContactMessage> {
        self.writer
            .exec(move |conn| {
                let existing: ContactMessageDB = contact_messages::table
                    .find(message_id)
                    .select(ContactMessageDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                let is_read = update.is_read.unwrap_or(existing.is_read);
                let updated: ContactMessageDB =
                    diesel::update(contact_messages::table.find(message_id))
                        .set(contact_messages::is_read.eq(is_read))
                        .returning(ContactMessageDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    pub async fn delete(&self, message_id: i64) -> Result<ContactMessage> {
        self.writer
            .exec(move |conn| {
                let existing: ContactMessageDB = contact_messages::table
                    .find(message_id)
                    .select(ContactMessageDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;

                diesel::delete(contact_messages::table.find(message_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(existing.into())
            })
            .await
    }

    pub fn get_by_id(&self, message_id: i64) -> Result<ContactMessage> {
        let mut conn = get_connection(&self.pool)?;

        let message: ContactMessageDB = contact_messages::table
            .find(message_id)
            .select(ContactMessageDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(message.into())
    }

    pub fn list(&self) -> Result<Vec<ContactMessage>> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<ContactMessageDB> = contact_messages::table
            .select(ContactMessageDB::as_select())
            .order(contact_messages::created_at.desc())
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(ContactMessage::from).collect())
    }
}
