//! The closed set of content kinds tracked by the sync subsystem.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sync::SyncError;

/// A kind of content row in the primary store.
///
/// The set is closed: every table that participates in secondary-store
/// synchronization has exactly one variant here, and the wire names match
/// the table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    PortfolioItems,
    GalleryImages,
    Bundles,
    ContactMessages,
}

impl EntityKind {
    /// Every kind, in the order the admin surface reports them.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::PortfolioItems,
        EntityKind::GalleryImages,
        EntityKind::Bundles,
        EntityKind::ContactMessages,
    ];

    /// The stable wire/table name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::PortfolioItems => "portfolio_items",
            EntityKind::GalleryImages => "gallery_images",
            EntityKind::Bundles => "bundles",
            EntityKind::ContactMessages => "contact_messages",
        }
    }

    /// Human-readable name used in notifications.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::PortfolioItems => "Portfolio Item",
            EntityKind::GalleryImages => "Gallery Image",
            EntityKind::Bundles => "Bundle",
            EntityKind::ContactMessages => "Message",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "portfolio_items" => Ok(EntityKind::PortfolioItems),
            "gallery_images" => Ok(EntityKind::GalleryImages),
            "bundles" => Ok(EntityKind::Bundles),
            "contact_messages" => Ok(EntityKind::ContactMessages),
            other => Err(SyncError::InvalidEntityKind(other.to_string())),
        }
    }
}

/// The mutation that triggered a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
            SyncAction::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncAction {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(SyncAction::Create),
            "update" => Ok(SyncAction::Update),
            "delete" => Ok(SyncAction::Delete),
            other => Err(SyncError::InvalidRequest(format!(
                "unknown sync action: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "unicorns".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, SyncError::InvalidEntityKind(_)));
    }

    #[test]
    fn test_kind_serializes_to_table_name() {
        let json = serde_json::to_string(&EntityKind::GalleryImages).unwrap();
        assert_eq!(json, "\"gallery_images\"");
    }
}
