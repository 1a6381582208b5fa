//! Error taxonomy for sync operations.

use thiserror::Error;

use crate::content::EntityKind;

/// Errors surfaced by the sync orchestrator.
///
/// These never reach the caller of the primary mutation: the dispatcher
/// swallows them after they have been recorded in the sync log. Only the
/// admin force-resync path returns them to a (privileged) caller.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The secondary store could not be reached or rejected the write.
    #[error("secondary store unavailable: {0}")]
    Adapter(#[from] AdapterError),

    /// Sync was requested for a row that no longer exists in the primary store.
    #[error("{kind} row {id} not found in the primary store")]
    NotFound { kind: EntityKind, id: i64 },

    /// A caller passed an entity kind outside the closed set. Programmer error.
    #[error("invalid entity kind: {0}")]
    InvalidEntityKind(String),

    /// The sync ledger could not be read or written.
    #[error("sync ledger operation failed: {0}")]
    Ledger(String),

    /// The sync request failed validation at the orchestrator boundary.
    #[error("invalid sync request: {0}")]
    InvalidRequest(String),
}

/// Failure modes of the secondary store adapter.
///
/// The orchestrator is the only caller and catches this kind; everything the
/// transport layer can throw (connect errors, timeouts, non-2xx responses,
/// body parse failures) collapses into `Unavailable`.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("secondary store unreachable or rejected the write: {0}")]
    Unavailable(String),
}

impl AdapterError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
