//! Generic row snapshots handed to the secondary-store adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, ValidationError};

/// The image of a primary-store row at the moment a mutation happened.
///
/// The sync subsystem treats the domain fields opaquely: they are carried as
/// a JSON object and written to the secondary store as-is. Only `id`,
/// `secondary_id` and `last_synced_at` are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    /// Primary-store numeric id.
    pub id: i64,
    /// Key of the record in the secondary store, once one has been assigned.
    pub secondary_id: Option<String>,
    /// When this row last reached the secondary store.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// The domain fields, serialized in wire form.
    pub fields: Map<String, Value>,
}

impl EntitySnapshot {
    /// Builds a snapshot from a serializable domain model.
    ///
    /// The sync-owned columns are stripped from the field map so the adapter
    /// never writes them as domain data.
    pub fn from_model<T: Serialize>(
        id: i64,
        secondary_id: Option<String>,
        last_synced_at: Option<DateTime<Utc>>,
        model: &T,
    ) -> Result<Self> {
        let mut fields = match serde_json::to_value(model)? {
            Value::Object(map) => map,
            _ => {
                return Err(ValidationError::InvalidInput(
                    "entity snapshot must serialize to a JSON object".to_string(),
                )
                .into())
            }
        };
        fields.remove("secondaryId");
        fields.remove("lastSyncedAt");

        Ok(Self {
            id,
            secondary_id,
            last_synced_at,
            fields,
        })
    }

    /// Minimal snapshot for a delete: only the identifiers survive the row.
    pub fn delete_marker(id: i64, secondary_id: Option<String>) -> Self {
        Self {
            id,
            secondary_id,
            last_synced_at: None,
            fields: Map::new(),
        }
    }

    /// Returns the fields plus the secondary key, as written to the store.
    pub fn document(&self, secondary_id: &str) -> Map<String, Value> {
        let mut doc = self.fields.clone();
        doc.insert(
            "secondaryId".to_string(),
            Value::String(secondary_id.to_string()),
        );
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        id: i64,
        title: String,
        secondary_id: Option<String>,
    }

    #[test]
    fn test_sync_columns_are_stripped_from_fields() {
        let row = Row {
            id: 7,
            title: "Fiber Install".to_string(),
            secondary_id: Some("abc123".to_string()),
        };
        let snapshot =
            EntitySnapshot::from_model(7, Some("abc123".to_string()), None, &row).unwrap();

        assert_eq!(snapshot.id, 7);
        assert_eq!(snapshot.secondary_id.as_deref(), Some("abc123"));
        assert!(!snapshot.fields.contains_key("secondaryId"));
        assert_eq!(snapshot.fields["title"], "Fiber Install");
    }

    #[test]
    fn test_document_carries_its_own_key() {
        let row = Row {
            id: 1,
            title: "t".to_string(),
            secondary_id: None,
        };
        let snapshot = EntitySnapshot::from_model(1, None, None, &row).unwrap();
        let doc = snapshot.document("key-1");
        assert_eq!(doc["secondaryId"], "key-1");
    }

    #[test]
    fn test_delete_marker_has_no_fields() {
        let marker = EntitySnapshot::delete_marker(3, Some("k".to_string()));
        assert!(marker.fields.is_empty());
        assert!(marker.last_synced_at.is_none());
    }
}
