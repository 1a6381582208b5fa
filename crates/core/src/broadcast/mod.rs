//! Short-lived change-event broadcasting with bounded retention.

pub mod channel;
pub mod event_model;
pub mod subscription;

pub use channel::{UpdatesChannel, EVENT_TTL};
pub use event_model::{BroadcastEvent, ChangePayload};
pub use subscription::SubscriptionHandle;
