//! Content domain: entity kinds, row snapshots, and per-kind models.

pub mod bundle_model;
pub mod contact_model;
pub mod gallery_model;
pub mod kind;
pub mod portfolio_model;
pub mod snapshot;

pub use bundle_model::{Bundle, BundleUpdate, NewBundle};
pub use contact_model::{ContactMessage, ContactMessageUpdate, NewContactMessage};
pub use gallery_model::{GalleryImage, GalleryImageUpdate, NewGalleryImage};
pub use kind::{EntityKind, SyncAction};
pub use portfolio_model::{NewPortfolioItem, PortfolioItem, PortfolioItemUpdate};
pub use snapshot::EntitySnapshot;
