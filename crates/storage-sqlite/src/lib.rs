//! SQLite storage implementation for Lumen.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in `lumen-core`
//! and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for every content kind
//! - The sync ledger (write-back columns + append-only attempt log)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. All other crates (`core`, `realtime`) are database-agnostic and
//! work with traits.
//!
//! ```text
//! core (domain)          realtime (secondary store)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod bundles;
pub mod contact;
pub mod gallery;
pub mod portfolio;
pub mod sync;

// Re-export database utilities
pub use db::{create_pool, get_connection, get_db_path, init, run_migrations, DbConnection, DbPool, WriteHandle};

// Re-export storage errors
pub use errors::StorageError;

// Re-export from lumen-core for convenience
pub use lumen_core::errors::{DatabaseError, Error, Result};
