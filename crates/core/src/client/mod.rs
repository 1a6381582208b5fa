//! Client-side consumption of broadcast events and live collection views.

pub mod subscription_manager;

pub use subscription_manager::{
    CollectionDocs, LiveCollectionSource, NoopLiveCollectionSource, SubscriptionManager,
    RECENT_EVENTS_CAPACITY,
};
