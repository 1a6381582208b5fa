//! Error types for the realtime adapter crate.

use thiserror::Error;

/// Result type alias for realtime store operations.
pub type Result<T> = std::result::Result<T, RealtimeError>;

/// Errors that can occur while talking to the realtime database.
///
/// These stay internal to this crate: at the `SecondaryStoreAdapter`
/// boundary every variant collapses into `AdapterError::Unavailable`.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the realtime database
    #[error("Realtime DB error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid client configuration (bad base URL, empty namespace, etc.)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RealtimeError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
