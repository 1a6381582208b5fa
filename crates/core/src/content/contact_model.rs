//! Contact message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::snapshot::EntitySnapshot;
use crate::errors::{Result, ValidationError};

/// A message submitted through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
    pub fn snapshot(&self) -> Result<EntitySnapshot> {
        EntitySnapshot::from_model(self.id, self.secondary_id.clone(), self.last_synced_at, self)
    }
}

/// Input model for a new contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContactMessage {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(
                ValidationError::InvalidInput("Sender name cannot be empty".to_string()).into(),
            );
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidInput(format!(
                "'{}' is not a valid email address",
                self.email
            ))
            .into());
        }
        if self.message.trim().is_empty() {
            return Err(
                ValidationError::InvalidInput("Message cannot be empty".to_string()).into(),
            );
        }
        Ok(())
    }
}

/// Editable attributes of a contact message (admin-side read flag).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageUpdate {
    pub is_read: Option<bool>,
}
