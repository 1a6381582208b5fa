//! Gallery image domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::snapshot::EntitySnapshot;
use crate::errors::{Result, ValidationError};

/// A previously uploaded image shown in the site gallery.
///
/// Upload handling itself (multipart parsing, file storage) lives in the host
/// application; this model only describes the stored row.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub uploaded_at: DateTime<Utc>,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl GalleryImage {
    pub fn snapshot(&self) -> Result<EntitySnapshot> {
        EntitySnapshot::from_model(self.id, self.secondary_id.clone(), self.last_synced_at, self)
    }
}

/// Input model for registering a new gallery image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGalleryImage {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl NewGalleryImage {
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(
                ValidationError::InvalidInput("Image filename cannot be empty".to_string()).into(),
            );
        }
        if self.url.trim().is_empty() {
            return Err(
                ValidationError::InvalidInput("Image URL cannot be empty".to_string()).into(),
            );
        }
        Ok(())
    }
}

/// Editable attributes of a gallery image.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageUpdate {
    pub caption: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}
