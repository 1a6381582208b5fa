//! Database model for contact messages.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use lumen_core::content::{ContactMessage, NewContactMessage};

use crate::schema::contact_messages;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = contact_messages)]
pub struct ContactMessageDB {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = contact_messages)]
pub struct NewContactMessageDB {
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl From<ContactMessageDB> for ContactMessage {
    fn from(db: ContactMessageDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            message: db.message,
            is_read: db.is_read,
            created_at: db.created_at.and_utc(),
            secondary_id: db.secondary_id,
            last_synced_at: db.last_synced_at.map(|ts| ts.and_utc()),
        }
    }
}

impl From<NewContactMessage> for NewContactMessageDB {
    fn from(message: NewContactMessage) -> Self {
        Self {
            name: message.name,
            email: message.email,
            message: message.message,
            is_read: false,
            created_at: Utc::now().naive_utc(),
        }
    }
}
