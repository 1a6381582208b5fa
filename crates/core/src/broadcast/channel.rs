//! The shared "updates" namespace all change events are published under.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use log::debug;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::broadcast::event_model::{BroadcastEvent, ChangePayload};
use crate::broadcast::subscription::SubscriptionHandle;
use crate::content::{EntityKind, SyncAction};

/// Retention window for published events.
pub const EVENT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Capacity of the internal notification channels. Lagging subscribers
/// recompute from the event store, so overflow only costs a wakeup.
const NOTIFY_CAPACITY: usize = 256;

/// In-process broadcast channel with bounded retention.
///
/// Cloneable handle; all clones share one event store. Constructed once at
/// startup and injected wherever events are published or consumed.
///
/// Two delivery modes:
/// - [`subscribe`](UpdatesChannel::subscribe) yields every published event
///   (used by the SSE firehose);
/// - [`subscribe_latest`](UpdatesChannel::subscribe_latest) delivers only the
///   single most recent live event for one kind, recomputed on every change
///   to the namespace.
///
/// Each event is scheduled for removal when its TTL elapses. Removal is
/// best-effort storage hygiene; `subscribe_latest` filters expired events
/// regardless, so a lost removal task cannot surface stale data.
#[derive(Clone)]
pub struct UpdatesChannel {
    inner: Arc<ChannelInner>,
    ttl: Duration,
}

struct ChannelInner {
    events: RwLock<Vec<BroadcastEvent>>,
    firehose: broadcast::Sender<BroadcastEvent>,
    changed: broadcast::Sender<()>,
    last_id: Mutex<i64>,
}

impl UpdatesChannel {
    pub fn new() -> Self {
        Self::with_ttl(EVENT_TTL)
    }

    /// Channel with a custom retention window.
    pub fn with_ttl(ttl: Duration) -> Self {
        let (firehose, _) = broadcast::channel(NOTIFY_CAPACITY);
        let (changed, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            inner: Arc::new(ChannelInner {
                events: RwLock::new(Vec::new()),
                firehose,
                changed,
                last_id: Mutex::new(0),
            }),
            ttl,
        }
    }

    /// Publishes a change event and schedules its removal after the TTL.
    pub fn publish(
        &self,
        entity_kind: EntityKind,
        action: SyncAction,
        payload: ChangePayload,
    ) -> BroadcastEvent {
        let now = Utc::now();
        let id = {
            let mut last = self.inner.last_id.lock().unwrap();
            *last = now.timestamp_millis().max(*last + 1);
            *last
        };
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::hours(24));
        let event = BroadcastEvent {
            id,
            entity_kind,
            action,
            payload,
            published_at: now,
            expires_at: now + ttl,
        };

        self.inner.events.write().unwrap().push(event.clone());
        // Receiver errors just mean nobody is listening right now.
        let _ = self.inner.firehose.send(event.clone());
        let _ = self.inner.changed.send(());
        debug!("published {} event for {}", action, entity_kind);

        let inner = self.inner.clone();
        let sleep = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(sleep).await;
            inner.events.write().unwrap().retain(|e| e.id != id);
            let _ = inner.changed.send(());
        });

        event
    }

    /// Convenience for publishing an upsert from a synced document.
    pub fn publish_upserted(
        &self,
        entity_kind: EntityKind,
        action: SyncAction,
        fields: Map<String, Value>,
    ) -> BroadcastEvent {
        self.publish(entity_kind, action, ChangePayload::Upserted { fields })
    }

    /// Receiver over every published event, in publication order.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.inner.firehose.subscribe()
    }

    /// The single most recent live event for a kind, if any.
    pub fn latest_for(&self, entity_kind: EntityKind) -> Option<BroadcastEvent> {
        let now = Utc::now();
        self.inner
            .events
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.entity_kind == entity_kind && !e.is_expired(now))
            .max_by_key(|e| (e.published_at, e.id))
            .cloned()
    }

    /// Delivers the latest live event for a kind to `callback` — once
    /// immediately if one exists, then again on every change to the
    /// namespace. Subscribers registered after a burst of publishes see only
    /// the newest event, never history.
    pub fn subscribe_latest(
        &self,
        entity_kind: EntityKind,
        callback: impl Fn(BroadcastEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let mut changes = self.inner.changed.subscribe();
        let channel = self.clone();
        let task = tokio::spawn(async move {
            if let Some(event) = channel.latest_for(entity_kind) {
                callback(event);
            }
            loop {
                match changes.recv().await {
                    Ok(()) => {
                        if let Some(event) = channel.latest_for(entity_kind) {
                            callback(event);
                        }
                    }
                    // Missed ticks are fine: the next recompute reads the
                    // full store anyway.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        SubscriptionHandle::for_task(task)
    }

    /// Number of retained (not yet removed) events.
    pub fn retained_len(&self) -> usize {
        self.inner.events.read().unwrap().len()
    }
}

impl Default for UpdatesChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn upsert_payload(title: &str) -> ChangePayload {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.to_string()));
        ChangePayload::Upserted { fields }
    }

    /// Polls until the subscriber task has had a chance to deliver.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_ids_are_strictly_monotonic() {
        let channel = UpdatesChannel::new();
        let a = channel.publish(EntityKind::Bundles, SyncAction::Create, upsert_payload("a"));
        let b = channel.publish(EntityKind::Bundles, SyncAction::Update, upsert_payload("b"));
        let c = channel.publish(EntityKind::Bundles, SyncAction::Update, upsert_payload("c"));
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[tokio::test]
    async fn test_late_subscriber_receives_only_newest_event() {
        let channel = UpdatesChannel::new();
        channel.publish(
            EntityKind::PortfolioItems,
            SyncAction::Create,
            upsert_payload("first"),
        );
        let newest = channel.publish(
            EntityKind::PortfolioItems,
            SyncAction::Update,
            upsert_payload("second"),
        );

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let handle = channel.subscribe_latest(EntityKind::PortfolioItems, move |event| {
            sink.lock().unwrap().push(event);
        });
        settle().await;

        let events = received.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, newest.id);
        handle.unsubscribe();
    }

    #[tokio::test]
    async fn test_subscriber_only_sees_matching_kind() {
        let channel = UpdatesChannel::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = channel.subscribe_latest(EntityKind::ContactMessages, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        channel.publish(EntityKind::Bundles, SyncAction::Create, upsert_payload("x"));
        settle().await;

        // A bundle publish ticks the namespace but there is no contact event
        // to deliver.
        assert_eq!(count.load(Ordering::SeqCst), 0);
        handle.unsubscribe();
    }

    #[tokio::test]
    async fn test_no_delivery_after_unsubscribe() {
        let channel = UpdatesChannel::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = channel.subscribe_latest(EntityKind::Bundles, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        handle.unsubscribe();
        handle.unsubscribe();

        channel.publish(EntityKind::Bundles, SyncAction::Create, upsert_payload("x"));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_are_removed_after_ttl() {
        let channel = UpdatesChannel::with_ttl(Duration::from_secs(60));
        channel.publish(EntityKind::Bundles, SyncAction::Create, upsert_payload("x"));
        assert_eq!(channel.retained_len(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        settle().await;
        assert_eq!(channel.retained_len(), 0);
        assert!(channel.latest_for(EntityKind::Bundles).is_none());
    }

    #[tokio::test]
    async fn test_expired_event_is_filtered_even_if_not_reaped() {
        // Zero TTL: expired the instant it is published. The removal task is
        // racing but latest_for must already exclude it by timestamp alone.
        let channel = UpdatesChannel::with_ttl(Duration::ZERO);
        channel.publish(EntityKind::Bundles, SyncAction::Create, upsert_payload("x"));
        assert!(channel.latest_for(EntityKind::Bundles).is_none());
    }

    #[tokio::test]
    async fn test_firehose_receives_every_event() {
        let channel = UpdatesChannel::new();
        let mut rx = channel.subscribe();
        channel.publish(EntityKind::Bundles, SyncAction::Create, upsert_payload("a"));
        channel.publish(
            EntityKind::GalleryImages,
            SyncAction::Delete,
            ChangePayload::Deleted {
                entity_id: 2,
                secondary_id: "k".to_string(),
            },
        );

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.entity_kind, EntityKind::Bundles);
        assert_eq!(second.action, SyncAction::Delete);
    }
}
