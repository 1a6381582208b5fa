//! Portfolio item domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::snapshot::EntitySnapshot;
use crate::errors::{Result, ValidationError};

/// Domain model for a showcased installation/project on the site.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Key of this row in the secondary store, once synced.
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl PortfolioItem {
    /// Snapshot of this row for the sync subsystem.
    pub fn snapshot(&self) -> Result<EntitySnapshot> {
        EntitySnapshot::from_model(self.id, self.secondary_id.clone(), self.last_synced_at, self)
    }
}

/// Input model for creating a new portfolio item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioItem {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl NewPortfolioItem {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::InvalidInput(
                "Portfolio title cannot be empty".to_string(),
            )
            .into());
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::InvalidInput(
                "Portfolio description cannot be empty".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Input model for updating an existing portfolio item.
///
/// Absent fields keep their current value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl PortfolioItemUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::InvalidInput(
                    "Portfolio title cannot be empty".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}
