//! Error types for the durable audit store.

/// Errors that can occur during audit store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// Appending a record failed.
    #[error("Append failed: {message}")]
    AppendFailed {
        /// Description of the append failure.
        message: String,
    },

    /// A read or filter query failed.
    #[error("Query failed: {message}")]
    QueryFailed {
        /// Description of the query failure.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `ConnectionError`.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `AppendFailed` error.
    #[must_use]
    pub fn append_failed(message: impl Into<String>) -> Self {
        Self::AppendFailed {
            message: message.into(),
        }
    }

    /// Creates a new `QueryFailed` error.
    #[must_use]
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error indicates the backend is unreachable.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError { .. })
    }
}
