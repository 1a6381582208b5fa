//! `SecondaryStoreAdapter` implementation over the realtime DB client.

use async_trait::async_trait;
use log::info;
use serde_json::{json, Value};
use uuid::Uuid;

use lumen_core::content::{EntityKind, EntitySnapshot};
use lumen_core::sync::{AdapterError, SecondaryStoreAdapter};

use crate::client::RealtimeDbClient;

/// Writes entity snapshots into the realtime database.
///
/// Documents are addressed as `{kind}/{key}`. Keys are allocated here on
/// first upsert and written into the document itself, so secondary-store
/// consumers can address records without knowing primary ids.
pub struct RealtimeStoreAdapter {
    client: RealtimeDbClient,
}

impl RealtimeStoreAdapter {
    pub fn new(client: RealtimeDbClient) -> Self {
        Self { client }
    }

    fn node(kind: EntityKind, key: &str) -> String {
        format!("{}/{}", kind.as_str(), key)
    }
}

#[async_trait]
impl SecondaryStoreAdapter for RealtimeStoreAdapter {
    async fn upsert(
        &self,
        kind: EntityKind,
        snapshot: &EntitySnapshot,
    ) -> Result<String, AdapterError> {
        match &snapshot.secondary_id {
            Some(key) => {
                // Partial merge against the existing document.
                let doc = Value::Object(snapshot.document(key));
                self.client
                    .patch(&Self::node(kind, key), &doc)
                    .await
                    .map_err(|e| AdapterError::unavailable(e.to_string()))?;
                info!("Updated {} in realtime store: {}", kind, key);
                Ok(key.clone())
            }
            None => {
                let key = Uuid::new_v4().to_string();
                let mut doc = snapshot.document(&key);
                // Server-side creation timestamp, resolved by the store.
                doc.insert("createdAt".to_string(), json!({ ".sv": "timestamp" }));
                self.client
                    .put(&Self::node(kind, &key), &Value::Object(doc))
                    .await
                    .map_err(|e| AdapterError::unavailable(e.to_string()))?;
                info!("Created {} in realtime store: {}", kind, key);
                Ok(key)
            }
        }
    }

    async fn remove(&self, kind: EntityKind, secondary_id: &str) -> Result<(), AdapterError> {
        // The client maps a missing node to success, making this idempotent.
        self.client
            .delete(&Self::node(kind, secondary_id))
            .await
            .map_err(|e| AdapterError::unavailable(e.to_string()))?;
        info!("Deleted {} from realtime store: {}", kind, secondary_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_paths_follow_kind_names() {
        assert_eq!(
            RealtimeStoreAdapter::node(EntityKind::GalleryImages, "k1"),
            "gallery_images/k1"
        );
    }
}
