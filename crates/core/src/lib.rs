//! Lumen Core - Domain entities, services, and traits.
//!
//! This crate contains the core logic for keeping the Lumen content
//! database in step with its secondary realtime store. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` and `realtime` crates.

pub mod broadcast;
pub mod client;
pub mod content;
pub mod errors;
pub mod sync;

// Re-export common types
pub use content::{EntityKind, EntitySnapshot, SyncAction};
pub use sync::{SyncDispatcher, SyncOrchestrator, SyncRequest};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
