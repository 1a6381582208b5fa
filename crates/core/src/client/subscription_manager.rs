//! Fan-out of received change events to local observers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::debug;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::broadcast::{BroadcastEvent, SubscriptionHandle, UpdatesChannel};
use crate::content::EntityKind;

/// Size of the recent-events ring buffer.
pub const RECENT_EVENTS_CAPACITY: usize = 10;

/// Capacity of the cross-component signal channel.
const SIGNAL_CAPACITY: usize = 64;

/// A full collection view: one JSON document per secondary-store record.
pub type CollectionDocs = Vec<Value>;

/// Source of live collection views over the secondary store.
///
/// Implementations deliver the complete current document list on subscribe
/// and again whenever the collection changes.
pub trait LiveCollectionSource: Send + Sync {
    fn subscribe(
        &self,
        kind: EntityKind,
        callback: Box<dyn Fn(CollectionDocs) + Send + Sync>,
    ) -> SubscriptionHandle;
}

/// Source for contexts that do not need collection views (tests, tooling).
#[derive(Clone, Default)]
pub struct NoopLiveCollectionSource;

impl LiveCollectionSource for NoopLiveCollectionSource {
    fn subscribe(
        &self,
        _kind: EntityKind,
        _callback: Box<dyn Fn(CollectionDocs) + Send + Sync>,
    ) -> SubscriptionHandle {
        SubscriptionHandle::for_task(tokio::spawn(async {}))
    }
}

/// Maintains live subscriptions and fans received events out locally.
///
/// On construction it subscribes to the broadcast channel for every entity
/// kind and, independently, to live collection views of the secondary store
/// for the same kinds. Each received event is:
/// - pushed into a bounded ring buffer of the last 10 events (oldest dropped
///   first, deduplicated by event id; process-local, reset on restart),
/// - delivered synchronously to every registered observer,
/// - re-broadcast on an opaque signal channel so unrelated components can
///   react without coupling to this type.
pub struct SubscriptionManager {
    recent: Mutex<VecDeque<BroadcastEvent>>,
    collections: RwLock<HashMap<EntityKind, CollectionDocs>>,
    #[allow(clippy::type_complexity)]
    observers: RwLock<Vec<Box<dyn Fn(&BroadcastEvent) + Send + Sync>>>,
    signal: broadcast::Sender<BroadcastEvent>,
    handles: Mutex<Vec<SubscriptionHandle>>,
    active: AtomicBool,
}

impl SubscriptionManager {
    /// Creates the manager and opens every subscription.
    pub fn new(updates: &UpdatesChannel, live: Arc<dyn LiveCollectionSource>) -> Arc<Self> {
        let (signal, _) = broadcast::channel(SIGNAL_CAPACITY);
        let manager = Arc::new(Self {
            recent: Mutex::new(VecDeque::with_capacity(RECENT_EVENTS_CAPACITY)),
            collections: RwLock::new(HashMap::new()),
            observers: RwLock::new(Vec::new()),
            signal,
            handles: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        });

        let mut handles = Vec::new();
        for kind in EntityKind::ALL {
            let on_event = {
                let manager = manager.clone();
                move |event: BroadcastEvent| manager.handle_event(event)
            };
            handles.push(updates.subscribe_latest(kind, on_event));

            let on_docs = {
                let manager = manager.clone();
                Box::new(move |docs: CollectionDocs| manager.handle_collection(kind, docs))
            };
            handles.push(live.subscribe(kind, on_docs));
        }
        *manager.handles.lock().unwrap() = handles;

        manager
    }

    fn handle_event(&self, event: BroadcastEvent) {
        {
            let mut recent = self.recent.lock().unwrap();
            // The channel re-delivers the per-kind latest on every namespace
            // change; an id we already hold is not news.
            if recent.iter().any(|e| e.id == event.id) {
                return;
            }
            recent.push_front(event.clone());
            recent.truncate(RECENT_EVENTS_CAPACITY);
        }
        debug!(
            "received {} event for {}",
            event.action, event.entity_kind
        );

        for observer in self.observers.read().unwrap().iter() {
            observer(&event);
        }
        let _ = self.signal.send(event);
    }

    fn handle_collection(&self, kind: EntityKind, docs: CollectionDocs) {
        self.collections.write().unwrap().insert(kind, docs);
    }

    /// The last received events, newest first.
    pub fn recent_events(&self) -> Vec<BroadcastEvent> {
        self.recent.lock().unwrap().iter().cloned().collect()
    }

    /// Empties the recent-events buffer.
    pub fn clear_recent(&self) {
        self.recent.lock().unwrap().clear();
    }

    /// Latest known collection view for a kind.
    pub fn collection(&self, kind: EntityKind) -> CollectionDocs {
        self.collections
            .read()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Registers an observer invoked synchronously for every received event.
    pub fn on_event(&self, observer: impl Fn(&BroadcastEvent) + Send + Sync + 'static) {
        self.observers.write().unwrap().push(Box::new(observer));
    }

    /// Opaque signal carrying every received event, for consumers that must
    /// not couple to this type directly.
    pub fn subscribe_signal(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.signal.subscribe()
    }

    /// Revokes every subscription. Calling this twice is a no-op.
    pub fn shutdown(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        for handle in self.handles.lock().unwrap().drain(..) {
            handle.unsubscribe();
        }
        debug!("subscription manager shut down");
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::ChangePayload;
    use crate::content::SyncAction;
    use serde_json::Map;
    use std::sync::atomic::AtomicUsize;

    fn payload(n: i64) -> ChangePayload {
        let mut fields = Map::new();
        fields.insert("n".to_string(), Value::from(n));
        ChangePayload::Upserted { fields }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_ring_buffer_caps_at_ten_oldest_first() {
        let updates = UpdatesChannel::new();
        let manager = SubscriptionManager::new(&updates, Arc::new(NoopLiveCollectionSource));
        settle().await;

        for n in 0..15 {
            updates.publish(EntityKind::Bundles, SyncAction::Update, payload(n));
            settle().await;
        }

        let recent = manager.recent_events();
        assert_eq!(recent.len(), RECENT_EVENTS_CAPACITY);
        // Newest first, oldest five evicted.
        match &recent[0].payload {
            ChangePayload::Upserted { fields } => assert_eq!(fields["n"], 14),
            _ => panic!("expected upsert"),
        }
        match &recent[9].payload {
            ChangePayload::Upserted { fields } => assert_eq!(fields["n"], 5),
            _ => panic!("expected upsert"),
        }
        manager.shutdown();
    }

    #[tokio::test]
    async fn test_redelivered_event_is_deduplicated() {
        let updates = UpdatesChannel::new();
        let manager = SubscriptionManager::new(&updates, Arc::new(NoopLiveCollectionSource));
        settle().await;

        updates.publish(EntityKind::Bundles, SyncAction::Create, payload(1));
        settle().await;
        // A publish for another kind ticks the namespace, re-delivering the
        // bundles event to its latest-subscriber.
        updates.publish(EntityKind::GalleryImages, SyncAction::Create, payload(2));
        settle().await;

        let bundle_events: Vec<_> = manager
            .recent_events()
            .into_iter()
            .filter(|e| e.entity_kind == EntityKind::Bundles)
            .collect();
        assert_eq!(bundle_events.len(), 1);
        manager.shutdown();
    }

    #[tokio::test]
    async fn test_observers_and_signal_receive_events() {
        let updates = UpdatesChannel::new();
        let manager = SubscriptionManager::new(&updates, Arc::new(NoopLiveCollectionSource));
        settle().await;

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        manager.on_event(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut signal = manager.subscribe_signal();

        updates.publish(EntityKind::PortfolioItems, SyncAction::Create, payload(1));
        settle().await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        let event = signal.try_recv().unwrap();
        assert_eq!(event.entity_kind, EntityKind::PortfolioItems);
        manager.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_twice_is_safe() {
        let updates = UpdatesChannel::new();
        let manager = SubscriptionManager::new(&updates, Arc::new(NoopLiveCollectionSource));
        settle().await;

        manager.shutdown();
        assert!(!manager.is_active());
        manager.shutdown();

        // Nothing is delivered after teardown.
        updates.publish(EntityKind::Bundles, SyncAction::Create, payload(1));
        settle().await;
        assert!(manager.recent_events().is_empty());
    }

    #[tokio::test]
    async fn test_collection_views_are_cached() {
        struct StaticSource;
        impl LiveCollectionSource for StaticSource {
            fn subscribe(
                &self,
                kind: EntityKind,
                callback: Box<dyn Fn(CollectionDocs) + Send + Sync>,
            ) -> SubscriptionHandle {
                if kind == EntityKind::Bundles {
                    callback(vec![serde_json::json!({"name": "Home 20"})]);
                }
                SubscriptionHandle::for_task(tokio::spawn(async {}))
            }
        }

        let updates = UpdatesChannel::new();
        let manager = SubscriptionManager::new(&updates, Arc::new(StaticSource));
        settle().await;

        let docs = manager.collection(EntityKind::Bundles);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "Home 20");
        assert!(manager.collection(EntityKind::ContactMessages).is_empty());
        manager.shutdown();
    }
}
