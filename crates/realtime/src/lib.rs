//! Realtime database adapter for the Lumen sync subsystem.
//!
//! Talks to a Firebase-style realtime database over its REST surface:
//! documents live under `{base}/{namespace}/{kind}/{key}.json`, and live
//! collection views are driven by the store's Server-Sent Events streaming
//! mode. The rest of the application only sees the `SecondaryStoreAdapter`
//! and `LiveCollectionSource` traits from `lumen-core`.

pub mod adapter;
pub mod client;
pub mod error;
pub mod live;

pub use adapter::RealtimeStoreAdapter;
pub use client::RealtimeDbClient;
pub use error::{RealtimeError, Result};
pub use live::RealtimeLiveSource;
