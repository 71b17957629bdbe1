//! Error types for the state container.

use thiserror::Error;

/// Main error type for container and accessor operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("no enclosing provider: use_app_state() called outside Provider::mount")]
    NoProvider,

    #[error("initial state must be a JSON object, got {0}")]
    InvalidState(String),

    #[error("partial update must be a JSON object, got {0}")]
    InvalidPartial(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Subscription was dropped")]
    SubscriptionDropped,
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Serialization(e.to_string())
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, StateError>;
