//! Live collection views over the realtime database's streaming mode.

use std::time::Duration;

use futures::StreamExt;
use log::{debug, warn};
use serde_json::Value;

use lumen_core::broadcast::SubscriptionHandle;
use lumen_core::client::{CollectionDocs, LiveCollectionSource};
use lumen_core::content::EntityKind;

use crate::client::RealtimeDbClient;
use crate::error::Result;

/// Delay before reopening a dropped stream.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Streams collection changes from the realtime database.
///
/// The store's event-stream mode emits a `put` with the full node on
/// connect, then `put`/`patch` events as children change. Rather than
/// replaying those deltas, each event triggers a re-read of the collection,
/// so callbacks always receive the complete current document list.
pub struct RealtimeLiveSource {
    client: RealtimeDbClient,
}

impl RealtimeLiveSource {
    pub fn new(client: RealtimeDbClient) -> Self {
        Self { client }
    }
}

/// Flattens a collection node (a key -> document map) into a document list,
/// ordered by key for stable output.
fn collection_docs(node: Option<Value>) -> CollectionDocs {
    match node {
        Some(Value::Object(map)) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            entries.into_iter().map(|(_, doc)| doc).collect()
        }
        _ => Vec::new(),
    }
}

async fn watch_collection(
    client: &RealtimeDbClient,
    kind: EntityKind,
    callback: &(dyn Fn(CollectionDocs) + Send + Sync),
) -> Result<()> {
    let response = client.stream(kind.as_str()).await?;
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut current_event: Option<String> = None;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = buffer.find('\n') {
            let line = buffer[..newline].trim_end_matches('\r').to_string();
            buffer.drain(..=newline);

            if let Some(event) = line.strip_prefix("event:") {
                current_event = Some(event.trim().to_string());
            } else if line.starts_with("data:") {
                match current_event.as_deref() {
                    Some("put") | Some("patch") => {
                        let node = client.get(kind.as_str()).await?;
                        callback(collection_docs(node));
                    }
                    // keep-alive and cancel events carry nothing we use
                    _ => debug!("ignoring stream event {:?}", current_event),
                }
            }
        }
    }

    Ok(())
}

impl LiveCollectionSource for RealtimeLiveSource {
    fn subscribe(
        &self,
        kind: EntityKind,
        callback: Box<dyn Fn(CollectionDocs) + Send + Sync>,
    ) -> SubscriptionHandle {
        let client = self.client.clone();
        let task = tokio::spawn(async move {
            loop {
                match watch_collection(&client, kind, callback.as_ref()).await {
                    Ok(()) => debug!("stream for {} ended, reconnecting", kind),
                    Err(err) => {
                        warn!("stream for {} failed: {}, retrying shortly", kind, err)
                    }
                }
                tokio::time::sleep(RETRY_DELAY).await;
            }
        });
        SubscriptionHandle::for_task(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_docs_orders_by_key() {
        let node = json!({
            "b": {"name": "second"},
            "a": {"name": "first"},
        });
        let docs = collection_docs(Some(node));
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["name"], "first");
        assert_eq!(docs[1]["name"], "second");
    }

    #[test]
    fn test_missing_node_is_empty() {
        assert!(collection_docs(None).is_empty());
        assert!(collection_docs(Some(Value::Null)).is_empty());
    }
}
