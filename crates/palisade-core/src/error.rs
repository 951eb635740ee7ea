use thiserror::Error;

/// Core error types for Palisade audit primitives
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid audit action: {0}")]
    InvalidAction(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),
}

impl CoreError {
    /// Create a new InvalidAction error
    pub fn invalid_action(action: impl Into<String>) -> Self {
        Self::InvalidAction(action.into())
    }

    /// Create a new InvalidTimestamp error
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp(message.into())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
