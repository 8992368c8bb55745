//! Error types for A2A client operations

use thiserror::Error;

/// Main error type for A2A client operations
#[derive(Debug, Error)]
pub enum A2AError {
    /// The request never produced a usable HTTP response
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// The agent answered with a non-success HTTP status
    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Remote agent returned a JSON-RPC error object
    #[error("Remote agent error: {message}")]
    RemoteAgentError { message: String, code: Option<i32> },

    /// Invalid configuration or parameters
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl A2AError {
    /// JSON-RPC error code reported by the agent, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            A2AError::RemoteAgentError { code, .. } => *code,
            _ => None,
        }
    }
}

/// Convenience type alias for Results with A2AError
pub type A2AResult<T> = std::result::Result<T, A2AError>;

impl From<reqwest::Error> for A2AError {
    fn from(error: reqwest::Error) -> Self {
        A2AError::NetworkError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(error: serde_json::Error) -> Self {
        A2AError::SerializationError {
            message: error.to_string(),
        }
    }
}
